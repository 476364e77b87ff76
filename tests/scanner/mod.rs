mod cancellation;
mod concurrency;
mod lifecycle;
mod output;
#[cfg(target_os = "linux")]
mod process_group;
