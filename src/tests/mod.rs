mod concurrency;
mod list;
mod shorten;
