//! Mock upstream providers for integration tests.

mod openai_compat;

pub use openai_compat::{OpenAIMock, SpawnedMock};
