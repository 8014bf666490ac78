pub mod test_store;
