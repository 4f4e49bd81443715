pub mod schema;
pub mod store;

pub use store::ChadoStore;
pub use store::ChadoTx;
pub use store::StoreError;
