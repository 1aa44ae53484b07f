pub mod feed_worker;
