use serde_json::Value;
use std::collections::BTreeMap;

use super::MetadataSource;

const ENV_REGION: &str = "AWS_REGION";
const ENV_FUNCTION_NAME: &str = "AWS_LAMBDA_FUNCTION_NAME";
const ENV_FUNCTION_VERSION: &str = "AWS_LAMBDA_FUNCTION_VERSION";
const ENV_FUNCTION_MEMORY: &str = "AWS_LAMBDA_FUNCTION_MEMORY_SIZE";
const ENV_RUNTIME: &str = "AWS_EXECUTION_ENV";

const CORRELATION_HEADER: &str = "x-correlation-id";
const VIEWER_COUNTRY_HEADER: &str = "cloudfront-viewer-country";

/// Reads the usual AWS Lambda invocation shapes: the handler context
/// (`invokedFunctionArn`, `functionName`, `awsRequestId`, ...) and API
/// Gateway style events (`requestContext`, `headers`, `path`).
///
/// Missing inputs produce missing keys.
#[derive(Debug, Clone, Default)]
pub struct LambdaMetadata {
    environment: Option<BTreeMap<String, String>>,
}

impl LambdaMetadata {
    /// Falls back to the process environment for runtime variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a fixed set of runtime variables instead of the process environment.
    pub fn with_environment<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let environment = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            environment: Some(environment),
        }
    }

    fn env(&self, name: &str) -> Option<String> {
        let value = match &self.environment {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };
        value.filter(|v| !v.is_empty())
    }
}

impl MetadataSource for LambdaMetadata {
    fn derive(&self, event: &Value, context: &Value) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        let arn = text(context, &["invokedFunctionArn"]);
        let arn_parts: Vec<&str> = arn
            .as_deref()
            .map(|a| a.split(':').collect())
            .unwrap_or_default();

        let account = arn_parts.get(4).map(|s| s.to_string());
        let region = arn_parts
            .get(3)
            .map(|s| s.to_string())
            .or_else(|| self.env(ENV_REGION));

        insert(&mut fields, "accountId", account);
        insert(&mut fields, "region", region);
        insert(
            &mut fields,
            "functionName",
            text(context, &["functionName"]).or_else(|| self.env(ENV_FUNCTION_NAME)),
        );
        insert(
            &mut fields,
            "functionVersion",
            text(context, &["functionVersion"]).or_else(|| self.env(ENV_FUNCTION_VERSION)),
        );
        insert(
            &mut fields,
            "functionMemorySize",
            text(context, &["memoryLimitInMB"]).or_else(|| self.env(ENV_FUNCTION_MEMORY)),
        );
        insert(&mut fields, "runtime", self.env(ENV_RUNTIME));
        insert(
            &mut fields,
            "resource",
            text(event, &["path"])
                .or_else(|| text(event, &["rawPath"]))
                .or_else(|| text(event, &["requestContext", "http", "path"])),
        );
        insert(&mut fields, "stage", text(event, &["requestContext", "stage"]));
        insert(
            &mut fields,
            "user",
            text(event, &["requestContext", "authorizer", "principalId"])
                .or_else(|| text(event, &["requestContext", "identity", "user"]))
                .or_else(|| text(event, &["requestContext", "identity", "userArn"])),
        );
        insert(&mut fields, "viewerCountry", header(event, VIEWER_COUNTRY_HEADER));
        insert(
            &mut fields,
            "correlationId",
            header(event, CORRELATION_HEADER)
                .or_else(|| text(context, &["awsRequestId"]))
                .or_else(|| text(event, &["requestContext", "requestId"])),
        );

        fields
    }
}

fn insert(fields: &mut BTreeMap<String, String>, key: &str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        fields.insert(key.to_string(), value);
    }
}

/// Walks `path` and renders a string or number leaf.
fn text(root: &Value, path: &[&str]) -> Option<String> {
    let leaf = path.iter().try_fold(root, |node, segment| node.get(segment))?;
    match leaf {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Header names are matched case-insensitively.
fn header(event: &Value, name: &str) -> Option<String> {
    event
        .get("headers")?
        .as_object()?
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, v)| v.as_str())
        .map(str::to_string)
}
