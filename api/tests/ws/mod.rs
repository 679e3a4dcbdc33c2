mod notifications_test;
mod ticket_feed_test;
mod ticket_presence_test;
