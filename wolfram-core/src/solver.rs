use async_trait::async_trait;
use std::{fmt::Debug, path::PathBuf};

use crate::{
    Config,
    error::Result,
    model::{Context, Step},
};

pub mod wolfram;

pub use wolfram::WolframAlphaSolver;

/// Contract a question solver fulfils towards the assistant.
///
/// Queries are expected to be normalized to the configured language
/// already. `context` is passed through untouched.
#[async_trait]
pub trait Solver: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Higher-priority solvers are asked first.
    fn priority(&self) -> u8;

    /// Short sentence for TTS, or `None` when there is no usable answer.
    async fn get_spoken_answer(
        &self,
        query: &str,
        context: Option<&Context>,
    ) -> Result<Option<String>>;

    /// Path to an image illustrating the answer.
    async fn get_image(&self, query: &str, context: Option<&Context>) -> Result<PathBuf>;

    /// Multi-step explanation of the answer.
    async fn get_expanded_answer(
        &self,
        query: &str,
        context: Option<&Context>,
    ) -> Result<Vec<Step>>;

    /// Raw structured result backing the other answers.
    async fn get_data(&self, query: &str, context: Option<&Context>)
    -> Result<serde_json::Value>;
}

/// Construct the default solver from config.
pub fn solver_from_config(config: &Config) -> Result<Box<dyn Solver>> {
    let solver = WolframAlphaSolver::new(config.clone())?;
    Ok(Box::new(solver))
}
