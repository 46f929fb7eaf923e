mod claim;
mod client;
