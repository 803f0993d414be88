//! Tag arguments consumed by the resolver
//!
//! A tag body such as `subdir/ubuntu.png magick:resize=100x100 alt="Logo"`
//! names one asset and an ordered list of proxy invocations. Order matters:
//! it is part of the fingerprint because it can change the output.

mod parse;

pub use parse::tokenize;

use crate::error::{ProximaError, ProximaResult};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One `group:name[=opts]` proxy request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProxyInvocation {
    group: String,
    name: String,
    opts: Option<String>,
}

impl ProxyInvocation {
    /// Create a validated invocation
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        opts: Option<String>,
    ) -> ProximaResult<Self> {
        let group = group.into();
        let name = name.into();
        validate_ident(&group, "proxy group")?;
        validate_ident(&name, "proxy name")?;
        if let Some(ref value) = opts {
            if value.is_empty() {
                return Err(ProximaError::tag_syntax(
                    format!("{}:{}=", group, name),
                    "proxy options cannot be empty",
                ));
            }
            if value.contains('\n') || value.contains('\r') {
                return Err(ProximaError::tag_syntax(
                    value.clone(),
                    "proxy options must not contain line breaks",
                ));
            }
        }
        Ok(Self { group, name, opts })
    }

    /// Parse a `group:name` or `group:name=opts` token
    pub fn parse(token: &str) -> ProximaResult<Self> {
        let (head, opts) = match token.split_once('=') {
            Some((head, opts)) => (head, Some(opts.to_string())),
            None => (token, None),
        };
        let (group, name) = head.split_once(':').ok_or_else(|| {
            ProximaError::tag_syntax(token, "expected group:name")
        })?;
        Self::new(group, name, opts)
    }

    /// Proxy group (e.g. `magick`)
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Proxy short name within its group (e.g. `resize`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inline options given after `=`
    pub fn opts(&self) -> Option<&str> {
        self.opts.as_deref()
    }

    /// Canonical `group:name:opts` form used for fingerprinting
    pub fn canonical(&self) -> String {
        format!(
            "{}:{}:{}",
            self.group,
            self.name,
            self.opts.as_deref().unwrap_or("")
        )
    }
}

impl fmt::Display for ProxyInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opts {
            Some(ref opts) => write!(f, "{}:{}={}", self.group, self.name, opts),
            None => write!(f, "{}:{}", self.group, self.name),
        }
    }
}

/// Ordered sequence of proxy invocations
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ProxyArgs(Vec<ProxyInvocation>);

impl ProxyArgs {
    /// Create from an ordered list of invocations
    pub fn new(invocations: Vec<ProxyInvocation>) -> Self {
        Self(invocations)
    }

    /// Invocations in execution order
    pub fn iter(&self) -> std::slice::Iter<'_, ProxyInvocation> {
        self.0.iter()
    }

    /// Number of invocations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no proxies were requested
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Canonical description: one `group:name:opts` line per invocation
    pub fn canonical(&self) -> String {
        self.0
            .iter()
            .map(ProxyInvocation::canonical)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a ProxyArgs {
    type Item = &'a ProxyInvocation;
    type IntoIter = std::slice::Iter<'a, ProxyInvocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ProxyArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Parsed arguments of one tag occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagArgs {
    /// Tag name the arguments were given to (e.g. `img`)
    pub tag: String,
    /// Asset name as written
    pub asset: String,
    /// Proxy invocations in order
    pub proxies: ProxyArgs,
    /// `key=value` attributes
    pub attributes: BTreeMap<String, String>,
    /// `@flag` switches
    pub flags: BTreeSet<String>,
}

impl TagArgs {
    /// Parse a tag body: asset name first, then proxies, attributes and flags
    pub fn parse(tag: &str, input: &str) -> ProximaResult<Self> {
        let mut tokens = tokenize(input)?.into_iter();
        let asset = tokens
            .next()
            .ok_or_else(|| ProximaError::tag_syntax(input, "missing asset name"))?;

        let mut proxies = Vec::new();
        let mut attributes = BTreeMap::new();
        let mut flags = BTreeSet::new();

        for token in tokens {
            if let Some(flag) = token.strip_prefix('@') {
                validate_ident(flag, "flag")?;
                flags.insert(flag.to_string());
                continue;
            }

            let colon = token.find(':');
            let equals = token.find('=');
            match (colon, equals) {
                (Some(c), Some(e)) if c < e => proxies.push(ProxyInvocation::parse(&token)?),
                (Some(_), None) => proxies.push(ProxyInvocation::parse(&token)?),
                (_, Some(e)) => {
                    let key = &token[..e];
                    validate_ident(key, "attribute")?;
                    attributes.insert(key.to_string(), token[e + 1..].to_string());
                }
                (None, None) => {
                    return Err(ProximaError::tag_syntax(
                        input,
                        format!("unexpected argument '{}'", token),
                    ))
                }
            }
        }

        Ok(Self {
            tag: tag.to_string(),
            asset,
            proxies: ProxyArgs::new(proxies),
            attributes,
            flags,
        })
    }

    /// The ordered proxy invocations
    pub fn args(&self) -> &ProxyArgs {
        &self.proxies
    }
}

/// Identifiers are non-empty ASCII alphanumerics, hyphens or underscores
fn validate_ident(value: &str, what: &str) -> ProximaResult<()> {
    if value.is_empty() {
        return Err(ProximaError::tag_syntax(value, format!("{} cannot be empty", what)));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ProximaError::tag_syntax(
            value,
            format!(
                "{} must contain only alphanumeric characters, hyphens, or underscores",
                what
            ),
        ));
    }
    Ok(())
}
