//! One question through model and database: prompt → complete → validate
//! (with at most one repair) → execute.

use std::time::Instant;

use serde_json::Value;

use graphquery_core::{Example, ExecutionStage, GraphQueryError, QueryOutcome};

use crate::backend::{GraphBackend, LanguageModel};
use crate::prompt::{build_prompt, build_repair_prompt, extract_query, STOP_SEQUENCES};

/// Borrowed view of everything one question needs.
pub struct PipelineContext<'a> {
    pub graph: &'a dyn GraphBackend,
    pub model: &'a dyn LanguageModel,
    pub schema: &'a str,
    pub examples: &'a [Example],
    pub validate: bool,
}

/// Generate a query for `question`, run it, and time both steps together.
pub async fn run_question(
    ctx: &PipelineContext<'_>,
    question: &str,
) -> Result<QueryOutcome, GraphQueryError> {
    let prompt = build_prompt(ctx.schema, question, ctx.examples);
    tracing::debug!(prompt = %prompt, "Prompt built");

    let start = Instant::now();

    let mut query = generate(ctx, prompt.as_str(), ExecutionStage::Generation).await?;
    tracing::debug!(query = %query, "Query generated");

    if ctx.validate {
        if let Err(error) = ctx.graph.validate(&query).await {
            tracing::warn!(query = %query, error = %error, "Generated query rejected, attempting repair");

            let repair = build_repair_prompt(
                ctx.schema,
                question,
                ctx.examples,
                &query,
                &error.to_string(),
            );
            query = generate(ctx, repair.as_str(), ExecutionStage::Repair).await?;
            tracing::debug!(query = %query, "Query repaired");

            ctx.graph
                .validate(&query)
                .await
                .map_err(|e| GraphQueryError::execution(ExecutionStage::Validation, e))?;
        }
    }

    let records = ctx
        .graph
        .execute(&query)
        .await
        .map_err(|e| GraphQueryError::execution(ExecutionStage::Database, e))?;

    let execution_time = start.elapsed();

    Ok(QueryOutcome {
        result: Value::Array(records.into_iter().map(Value::Object).collect()),
        generated_query: query,
        execution_time,
    })
}

async fn generate(
    ctx: &PipelineContext<'_>,
    prompt: &str,
    stage: ExecutionStage,
) -> Result<String, GraphQueryError> {
    let completion = ctx
        .model
        .complete(prompt, &STOP_SEQUENCES)
        .await
        .map_err(|e| GraphQueryError::execution(stage, e))?;

    let query = extract_query(&completion);
    if query.is_empty() {
        return Err(GraphQueryError::execution(
            stage,
            anyhow::anyhow!("model returned no query"),
        ));
    }
    Ok(query)
}
