mod test_offer_answer_relay;
mod test_unknown_target_is_dropped;
