//! Markdown page for a single command.

use crate::constants::*;
use crate::error::PlatyError;
use crate::model::{CommandHelp, Example, InputOutput, Link, Parameter, Position, SyntaxItem};
use crate::types;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where a writer puts its output
#[derive(Debug, Clone)]
pub struct WriterSettings {
    pub destination: PathBuf,
}

impl WriterSettings {
    pub fn new(destination: impl Into<PathBuf>) -> anyhow::Result<WriterSettings> {
        let destination = destination.into();
        if destination.as_os_str().is_empty() {
            return Err(PlatyError::ArgumentInvalid("destination path is empty".to_string()).into());
        }
        Ok(WriterSettings { destination })
    }
}

/// Writes `contents` to `path`, replacing any existing file. The file is only
/// held open for the duration of the call.
pub(crate) fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not create: {}", path.to_string_lossy()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .and_then(|_| writer.flush())
        .with_context(|| format!("failed to write: {}", path.to_string_lossy()))?;
    Ok(())
}

pub struct CommandHelpMarkdownWriter<'a> {
    settings: WriterSettings,
    help: &'a CommandHelp,
}

impl<'a> CommandHelpMarkdownWriter<'a> {
    pub fn new(settings: WriterSettings, help: &'a CommandHelp) -> Self {
        CommandHelpMarkdownWriter { settings, help }
    }

    /// Writes the page to the destination file, overwriting it.
    pub fn write(&self) -> anyhow::Result<PathBuf> {
        write_file(&self.settings.destination, &render(self.help))?;
        log::debug!(
            "{}: wrote {}",
            self.help.title,
            self.settings.destination.to_string_lossy()
        );
        Ok(self.settings.destination.clone())
    }
}

fn section(header: &str, body: &str) -> String {
    let body = body.trim_end();
    if body.is_empty() {
        header.to_string()
    } else {
        format!("{}\n\n{}", header, body)
    }
}

fn bool_string(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Renders the whole page. Sections are separated by exactly one blank line
/// and the page ends with a single newline.
pub fn render(help: &CommandHelp) -> String {
    let sections = [
        metadata_header(help),
        format!("# {}", help.title),
        section(SYNOPSIS_MD_HEADER, &help.synopsis),
        syntax(help),
        section(DESCRIPTION_MD_HEADER, &help.description),
        examples(help.examples()),
        parameters(help),
        inputs_outputs(INPUTS_MD_HEADER, help.inputs()),
        inputs_outputs(OUTPUTS_MD_HEADER, help.outputs()),
        section(NOTES_MD_HEADER, &help.notes),
        related_links(help.related_links()),
    ];

    let mut page = sections.join("\n\n");
    page.push('\n');
    page
}

fn metadata_header(help: &CommandHelp) -> String {
    [
        YML_HEADER.to_string(),
        format!("external help file: {}-help.xml", help.module_name),
        format!("Module Name: {}", help.module_name),
        "online version:".to_string(),
        SCHEMA_VERSION_YML.to_string(),
        YML_HEADER.to_string(),
    ]
    .join("\n")
}

fn parameter_syntax(param: &Parameter) -> String {
    if param.is_switch() {
        return if param.required {
            format!("-{}", param.name)
        } else {
            format!("[-{}]", param.name)
        };
    }

    let name = match param.position {
        Position::Index(_) => format!("[-{}]", param.name),
        Position::Named => format!("-{}", param.name),
    };
    // an untyped parameter still gets a value slot, `[-Name]` alone means a switch
    let type_name = param.type_name().unwrap_or(SYSTEM_OBJECT_TYPENAME);
    let name_and_type = format!("{} <{}>", name, types::short_name(type_name));

    if param.required {
        name_and_type
    } else {
        format!("[{}]", name_and_type)
    }
}

/// `Get-Foo [-Name] <String> [-Force] [<CommonParameters>]`
pub fn syntax_string(item: &SyntaxItem) -> String {
    let mut params: Vec<&Parameter> = item
        .parameters()
        .iter()
        .filter(|p| !p.dont_show)
        .collect();
    params.sort_by_key(|p| match p.position {
        Position::Index(i) => (0, i),
        Position::Named => (1, 0),
    });

    let mut parts = vec![item.command_name.clone()];
    parts.extend(params.into_iter().map(parameter_syntax));
    parts.push("[<CommonParameters>]".to_string());
    parts.join(" ")
}

/// `number` tells apart several syntax items that have no parameter-set name.
fn syntax_item_block(item: &SyntaxItem, number: Option<usize>) -> String {
    let set_name = match (&item.parameter_set_name, number) {
        (Some(name), _) => name.clone(),
        (None, Some(n)) => format!("{} {}", ALL_PARAMETER_SETS, n),
        (None, None) => ALL_PARAMETER_SETS.to_string(),
    };
    let heading = if item.is_default_parameter_set {
        format!("### {} (Default)", set_name)
    } else {
        format!("### {}", set_name)
    };

    format!("{}\n\n```\n{}\n```", heading, syntax_string(item))
}

fn syntax(help: &CommandHelp) -> String {
    let mut items: Vec<&SyntaxItem> = help.syntax().iter().collect();
    // stable, so the remaining sets keep their order
    items.sort_by_key(|item| !item.is_default_parameter_set);

    let unnamed = items
        .iter()
        .filter(|item| item.parameter_set_name.is_none())
        .count();
    let mut unnamed_seen = 0;
    let blocks: Vec<String> = items
        .into_iter()
        .map(|item| {
            let number = if item.parameter_set_name.is_none() && unnamed > 1 {
                unnamed_seen += 1;
                Some(unnamed_seen)
            } else {
                None
            };
            syntax_item_block(item, number)
        })
        .collect();
    section(SYNTAX_MD_HEADER, &blocks.join("\n\n"))
}

fn example_block(number: usize, example: &Example) -> String {
    let mut block = if example.title.is_empty() {
        format!("### Example {}", number)
    } else {
        format!("### Example {}: {}", number, example.title)
    };
    block.push_str(&format!("\n\n```powershell\n{}\n```", example.code.trim_end()));
    if !example.remarks.trim().is_empty() {
        block.push_str("\n\n");
        block.push_str(example.remarks.trim_end());
    }
    block
}

fn examples(examples: &[Example]) -> String {
    let blocks: Vec<String> = examples
        .iter()
        .enumerate()
        .map(|(i, example)| example_block(i + 1, example))
        .collect();
    section(EXAMPLES_MD_HEADER, &blocks.join("\n\n"))
}

fn key_value(key: &str, value: &str) -> String {
    if value.is_empty() {
        format!("{}:", key)
    } else {
        format!("{}: {}", key, value)
    }
}

fn parameter_sets_string(param: &Parameter, all_sets: &[&str]) -> String {
    let sets = param.parameter_sets();
    let in_every_set = !all_sets.is_empty()
        && all_sets
            .iter()
            .all(|set| sets.iter().any(|s| s.as_str() == *set));

    if sets.is_empty() || in_every_set || sets.iter().any(|s| s.as_str() == ALL_PARAMETER_SETS) {
        "(All)".to_string()
    } else {
        sets.join(", ")
    }
}

fn parameter_block(param: &Parameter, all_sets: &[&str]) -> String {
    let position = match param.position {
        Position::Named => "Named".to_string(),
        Position::Index(i) => i.to_string(),
    };

    let mut metadata = vec![
        key_value("Type", param.type_name().map(types::short_name).unwrap_or("")),
        key_value("Parameter Sets", &parameter_sets_string(param, all_sets)),
        key_value("Aliases", &param.aliases.join(", ")),
    ];
    if !param.accepted_values().is_empty() {
        metadata.push(key_value("Accepted values", &param.accepted_values().join(", ")));
    }
    metadata.push(String::new());
    metadata.push(key_value("Required", bool_string(param.required)));
    metadata.push(key_value("Position", &position));
    metadata.push(key_value(
        "Default value",
        param.default_value.as_deref().unwrap_or(NONE_STRING),
    ));
    metadata.push(key_value("Accept pipeline input", bool_string(param.pipeline_input)));
    metadata.push(key_value("Accept wildcard characters", bool_string(param.globbing)));

    let mut block = format!("### -{}", param.name);
    if !param.description.trim().is_empty() {
        block.push_str("\n\n");
        block.push_str(param.description.trim_end());
    }
    block.push_str(&format!("\n\n```yaml\n{}\n```", metadata.join("\n")));
    block
}

/// Parameters in ordinal name order. The sort is done on a copy of the list;
/// the model keeps its own order.
pub fn sorted_parameters(help: &CommandHelp) -> Vec<&Parameter> {
    let mut params: Vec<&Parameter> = help.parameters().iter().collect();
    params.sort_by(|a, b| a.name.cmp(&b.name));
    params
}

fn parameters(help: &CommandHelp) -> String {
    let all_sets: Vec<&str> = help
        .syntax()
        .iter()
        .filter_map(|s| s.parameter_set_name.as_deref())
        .filter(|s| *s != ALL_PARAMETER_SETS)
        .collect();

    let mut blocks: Vec<String> = sorted_parameters(help)
        .into_iter()
        .filter(|p| !p.dont_show)
        .map(|p| parameter_block(p, &all_sets))
        .collect();
    blocks.push(COMMON_PARAMETERS.to_string());

    section(PARAMETERS_MD_HEADER, &blocks.join("\n\n"))
}

fn inputs_outputs(header: &str, items: &[InputOutput]) -> String {
    let blocks: Vec<String> = items
        .iter()
        .flat_map(|io| io.items().iter())
        .map(|(type_name, description)| {
            section(&format!("### {}", type_name), description)
        })
        .collect();
    section(header, &blocks.join("\n\n"))
}

fn related_links(links: &[Link]) -> String {
    if links.is_empty() {
        return section(RELATED_LINKS_MD_HEADER, FILL_IN_RELATED_LINKS);
    }

    let lines: Vec<String> = links
        .iter()
        .map(|link| {
            let text = if link.link_text.is_empty() {
                &link.uri
            } else {
                &link.link_text
            };
            format!("[{}]({})", text, link.uri)
        })
        .collect();
    section(RELATED_LINKS_MD_HEADER, &lines.join("\n\n"))
}
