mod test_disconnect_notifies_remaining;
mod test_first_join_creates_room;
mod test_second_join_sees_existing_member;
