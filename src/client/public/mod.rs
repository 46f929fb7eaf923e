mod connect_ops;
mod message_ops;
mod worker_ops;
