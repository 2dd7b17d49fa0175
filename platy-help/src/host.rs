//! Records exchanged with a PowerShell host: command descriptors (the shape of
//! `Get-Command`) and legacy help records (the shape of `Get-Help`), plus the
//! [`CommandHost`] seam the command importer talks to.

use crate::error::PlatyError;
use anyhow::Context;
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommandDescriptor {
    pub name: String,
    #[serde(default)]
    pub module_name: String,
    #[serde(default)]
    pub module_guid: Option<Uuid>,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub parameter_sets: Vec<ParameterSetDescriptor>,
}

impl CommandDescriptor {
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(default)]
    pub parameter_type: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub parameter_sets: Vec<ParameterSetMembership>,
    #[serde(default)]
    pub supports_wildcards: bool,
    #[serde(default)]
    pub dont_show: bool,
    #[serde(default)]
    pub valid_values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterSetMembership {
    pub name: String,
    #[serde(default)]
    pub is_mandatory: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterSetDescriptor {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub parameters: Vec<SetParameterDescriptor>,
}

/// Attributes of a parameter within one parameter set
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetParameterDescriptor {
    pub name: String,
    #[serde(default)]
    pub is_mandatory: bool,
    /// Missing or negative means the parameter is named
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub value_from_pipeline: bool,
    #[serde(default)]
    pub value_from_pipeline_by_property_name: bool,
}

/// `ConvertTo-Json` writes single-element collections as a bare object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBlock {
    #[serde(default, alias = "Text", deserialize_with = "lenient")]
    pub text: Option<String>,
}

/// Auto-generated help serializes empty sections as `""`; any value of the
/// wrong shape is read as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Legacy help record. Anything may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyHelp {
    #[serde(default, alias = "Name", deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, alias = "Synopsis", deserialize_with = "lenient")]
    pub synopsis: Option<String>,
    #[serde(default, alias = "Description", deserialize_with = "lenient")]
    pub description: Option<OneOrMany<TextBlock>>,
    #[serde(default, alias = "Examples", deserialize_with = "lenient")]
    pub examples: Option<LegacyExamples>,
    #[serde(default, alias = "Parameters", deserialize_with = "lenient")]
    pub parameters: Option<LegacyParameters>,
    #[serde(
        default,
        rename = "inputTypes",
        alias = "InputTypes",
        deserialize_with = "lenient"
    )]
    pub input_types: Option<LegacyInputTypes>,
    #[serde(
        default,
        rename = "returnValues",
        alias = "ReturnValues",
        deserialize_with = "lenient"
    )]
    pub return_values: Option<LegacyReturnValues>,
    #[serde(
        default,
        rename = "alertSet",
        alias = "AlertSet",
        deserialize_with = "lenient"
    )]
    pub alert_set: Option<LegacyAlertSet>,
    #[serde(
        default,
        rename = "relatedLinks",
        alias = "RelatedLinks",
        deserialize_with = "lenient"
    )]
    pub related_links: Option<LegacyRelatedLinks>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyExamples {
    #[serde(default, alias = "Example", deserialize_with = "lenient")]
    pub example: Option<OneOrMany<LegacyExample>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyExample {
    #[serde(default, alias = "Title", deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, alias = "Code", deserialize_with = "lenient")]
    pub code: Option<String>,
    #[serde(default, alias = "Remarks", deserialize_with = "lenient")]
    pub remarks: Option<OneOrMany<TextBlock>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyParameters {
    #[serde(default, alias = "Parameter", deserialize_with = "lenient")]
    pub parameter: Option<OneOrMany<LegacyParameter>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyParameter {
    #[serde(default, alias = "Name", deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, alias = "Description", deserialize_with = "lenient")]
    pub description: Option<OneOrMany<TextBlock>>,
    #[serde(default, rename = "defaultValue", alias = "DefaultValue", deserialize_with = "lenient")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyInputTypes {
    #[serde(default, rename = "inputType", alias = "InputType", deserialize_with = "lenient")]
    pub input_type: Option<OneOrMany<LegacyTypeRecord>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyReturnValues {
    #[serde(default, rename = "returnValue", alias = "ReturnValue", deserialize_with = "lenient")]
    pub return_value: Option<OneOrMany<LegacyTypeRecord>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyTypeRecord {
    #[serde(default, rename = "type", alias = "Type", deserialize_with = "lenient")]
    pub type_info: Option<LegacyTypeName>,
    #[serde(default, alias = "Description", deserialize_with = "lenient")]
    pub description: Option<OneOrMany<TextBlock>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyTypeName {
    #[serde(default, alias = "Name", deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyAlertSet {
    #[serde(default, alias = "Alert", deserialize_with = "lenient")]
    pub alert: Option<OneOrMany<TextBlock>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyRelatedLinks {
    #[serde(
        default,
        rename = "navigationLink",
        alias = "NavigationLink",
        deserialize_with = "lenient"
    )]
    pub navigation_link: Option<OneOrMany<LegacyNavigationLink>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyNavigationLink {
    #[serde(default, alias = "Uri", deserialize_with = "lenient")]
    pub uri: Option<String>,
    #[serde(default, rename = "linkText", alias = "LinkText", deserialize_with = "lenient")]
    pub link_text: Option<String>,
}

impl LegacyHelp {
    fn has_text(blocks: &Option<OneOrMany<TextBlock>>) -> bool {
        blocks
            .as_ref()
            .map(|b| {
                b.as_slice()
                    .iter()
                    .any(|t| t.text.as_deref().map_or(false, |s| !s.trim().is_empty()))
            })
            .unwrap_or(false)
    }

    /// Help generated by the host for commands without authored help has
    /// neither a description nor examples.
    pub fn is_auto_generated(&self) -> bool {
        let has_examples = self
            .examples
            .as_ref()
            .and_then(|e| e.example.as_ref())
            .map(|e| !e.as_slice().is_empty())
            .unwrap_or(false);

        !Self::has_text(&self.description) && !has_examples
    }

    pub fn example_list(&self) -> &[LegacyExample] {
        self.examples
            .as_ref()
            .and_then(|e| e.example.as_ref())
            .map(OneOrMany::as_slice)
            .unwrap_or(&[])
    }

    pub fn parameter_list(&self) -> &[LegacyParameter] {
        self.parameters
            .as_ref()
            .and_then(|p| p.parameter.as_ref())
            .map(OneOrMany::as_slice)
            .unwrap_or(&[])
    }

    pub fn parameter(&self, name: &str) -> Option<&LegacyParameter> {
        self.parameter_list().iter().find(|p| {
            p.name
                .as_deref()
                .map_or(false, |n| n.trim().eq_ignore_ascii_case(name))
        })
    }

    pub fn input_type_list(&self) -> Option<&[LegacyTypeRecord]> {
        self.input_types
            .as_ref()
            .and_then(|i| i.input_type.as_ref())
            .map(OneOrMany::as_slice)
    }

    pub fn return_value_list(&self) -> Option<&[LegacyTypeRecord]> {
        self.return_values
            .as_ref()
            .and_then(|r| r.return_value.as_ref())
            .map(OneOrMany::as_slice)
    }

    pub fn alert_list(&self) -> Option<&[TextBlock]> {
        self.alert_set
            .as_ref()
            .and_then(|a| a.alert.as_ref())
            .map(OneOrMany::as_slice)
    }

    pub fn navigation_link_list(&self) -> &[LegacyNavigationLink] {
        self.related_links
            .as_ref()
            .and_then(|r| r.navigation_link.as_ref())
            .map(OneOrMany::as_slice)
            .unwrap_or(&[])
    }
}

/// Source of command metadata and help records.
pub trait CommandHost {
    /// Descriptors for every command matching `name` (which may contain wildcards)
    fn get_command_info(&self, name: &str) -> anyhow::Result<Vec<CommandDescriptor>>;

    /// Help records the host has for the exact command `name`
    fn get_help_for_command(&self, name: &str) -> anyhow::Result<Vec<LegacyHelp>>;
}

/// A host backed by a JSON snapshot of command descriptors and help records
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JsonHost {
    #[serde(default)]
    commands: Vec<CommandDescriptor>,
    #[serde(default)]
    help: HashMap<String, OneOrMany<LegacyHelp>>,
}

pub(crate) fn read_json<P: AsRef<Path>>(path: P) -> anyhow::Result<serde_json::Value> {
    let file = File::open(&path)
        .with_context(|| format!("could not open: {}", path.as_ref().to_string_lossy()))?;
    let mut buf_reader = BufReader::new(file);
    let mut bytes = Vec::new();
    buf_reader.read_to_end(&mut bytes).with_context(|| {
        format!(
            "failed to load json string from: {}",
            path.as_ref().to_string_lossy()
        )
    })?;

    let json: serde_json::Value = serde_json::from_slice(&bytes).with_context(|| {
        format!(
            "failed to parse json from: {}",
            path.as_ref().to_string_lossy()
        )
    })?;

    Ok(json)
}

impl JsonHost {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<JsonHost> {
        let json = read_json(&path)?;
        Self::from_json(json).with_context(|| {
            format!(
                "unexpected snapshot layout in: {}",
                path.as_ref().to_string_lossy()
            )
        })
    }

    pub fn from_json(json: serde_json::Value) -> anyhow::Result<JsonHost> {
        Ok(serde_json::from_value(json)?)
    }

    pub fn add_command(&mut self, descriptor: CommandDescriptor, help: Vec<LegacyHelp>) {
        self.help
            .insert(descriptor.name.clone(), OneOrMany::Many(help));
        self.commands.push(descriptor);
    }
}

/// Case-insensitive matcher for `*` and `?` wildcards
fn wildcard_matcher(pattern: &str) -> anyhow::Result<regex::Regex> {
    let mut expr = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            c => expr.push_str(&regex::escape(&c.to_string())),
        }
    }
    expr.push('$');

    Ok(RegexBuilder::new(&expr).case_insensitive(true).build()?)
}

impl CommandHost for JsonHost {
    fn get_command_info(&self, name: &str) -> anyhow::Result<Vec<CommandDescriptor>> {
        if name.trim().is_empty() {
            return Err(PlatyError::ArgumentInvalid("command name is empty".to_string()).into());
        }
        let matcher = wildcard_matcher(name.trim())?;

        Ok(self
            .commands
            .iter()
            .filter(|c| matcher.is_match(&c.name))
            .cloned()
            .collect())
    }

    fn get_help_for_command(&self, name: &str) -> anyhow::Result<Vec<LegacyHelp>> {
        Ok(self
            .help
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice().to_vec())
            .unwrap_or_default())
    }
}
