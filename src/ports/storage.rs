/// Synchronous string key-value storage, last writer wins.
pub trait KeyValueStore: 'static {
    type Error: std::fmt::Display + 'static;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}
