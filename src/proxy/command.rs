//! Proxies backed by an external command
//!
//! Declared in configuration under `[[proxies]]`. The working content is
//! written to a scratch `{input}` file, the command runs, and the result is
//! read back from `{output}` (or from `{input}` if the command edited it in
//! place).

use crate::asset::WorkingAsset;
use crate::config::schema::ProxyConfig;
use crate::error::{ProximaError, ProximaResult, TransformError};
use crate::proxy::registry::{ProxyFactory, ProxyRegistry, Transform};
use crate::tag::TagArgs;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Factory for a command-backed proxy
#[derive(Debug, Clone)]
pub struct CommandProxy {
    command: Vec<String>,
    content_type: Option<String>,
}

impl CommandProxy {
    /// Create from an argv template and an optional resulting content type
    pub fn new(command: Vec<String>, content_type: Option<String>) -> Self {
        Self {
            command,
            content_type,
        }
    }

    /// Build from a configuration entry
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(config.command.clone(), config.content_type.clone())
    }
}

impl ProxyFactory for CommandProxy {
    fn construct(
        &self,
        _asset: &WorkingAsset,
        opts: Option<&str>,
        _args: &TagArgs,
    ) -> Result<Box<dyn Transform>, TransformError> {
        if self.command.is_empty() {
            return Err("command proxy has an empty command".into());
        }

        Ok(Box::new(CommandRun {
            command: self.command.clone(),
            opts: opts.unwrap_or("").to_string(),
            content_type: self.content_type.clone(),
        }))
    }
}

/// One pending command execution
struct CommandRun {
    command: Vec<String>,
    opts: String,
    content_type: Option<String>,
}

impl Transform for CommandRun {
    fn process(self: Box<Self>, mut asset: WorkingAsset) -> Result<WorkingAsset, TransformError> {
        let CommandRun {
            command,
            opts,
            content_type,
        } = *self;

        let scratch = tempfile::TempDir::new()?;
        let ext = Path::new(asset.logical_path())
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let input = scratch.path().join(format!("input{}", ext));
        let output = scratch.path().join(format!("output{}", ext));
        fs::write(&input, asset.content())?;

        let argv: Vec<String> = command
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
                    .replace("{opts}", &opts)
                    .replace("{logical_path}", asset.logical_path())
            })
            .collect();
        let command_line = argv.join(" ");
        debug!("Executing proxy command: {}", command_line);

        let result = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ProximaError::command_failed(command_line.clone(), e))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(ProximaError::command_exec(command_line, stderr).into());
        }

        let produced = if output.exists() { &output } else { &input };
        asset.set_content(fs::read(produced)?);
        if let Some(content_type) = content_type {
            asset.set_content_type(content_type);
        }

        Ok(asset)
    }
}

/// Register every configured command proxy
pub fn register_configured(
    registry: &mut ProxyRegistry,
    proxies: &[ProxyConfig],
) -> ProximaResult<()> {
    for proxy in proxies {
        let tags: Vec<&str> = proxy.tags.iter().map(String::as_str).collect();
        registry.register(
            &proxy.group,
            &proxy.name,
            &tags,
            CommandProxy::from_config(proxy),
        )?;
    }
    Ok(())
}
