
mod test_memoize;
mod test_schedulers;
