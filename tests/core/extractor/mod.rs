pub mod test_markdown;
pub mod test_registry;
