mod test_health_probe;
