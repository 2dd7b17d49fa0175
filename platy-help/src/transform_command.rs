//! Builds [`CommandHelp`] from host command metadata and the legacy help the
//! host has for it.

use crate::constants;
use crate::error::PlatyError;
use crate::host::{
    CommandDescriptor, CommandHost, LegacyHelp, LegacyTypeRecord, OneOrMany, TextBlock,
};
use crate::model::{
    CommandHelp, Example, InputOutput, Link, Parameter, ParameterType, Position, SyntaxItem,
};
use regex::Regex;

pub struct CommandTransform<'h, H: CommandHost> {
    host: &'h H,
    locale: String,
}

impl<'h, H: CommandHost> CommandTransform<'h, H> {
    pub fn new(host: &'h H) -> Self {
        CommandTransform {
            host,
            locale: constants::DEFAULT_LOCALE.to_string(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// One [`CommandHelp`] per command matching each of `command_names`, in order.
    pub fn transform<I>(&self, command_names: I) -> anyhow::Result<Vec<CommandHelp>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut cmd_help = Vec::new();

        for command in command_names {
            let command = command.as_ref();
            let descriptors = self.host.get_command_info(command)?;
            if descriptors.is_empty() {
                log::warn!("No command found matching '{}'", command);
            }

            for descriptor in descriptors {
                let help = self.host.get_help_for_command(&descriptor.name)?;
                cmd_help.push(self.convert_command(&descriptor, help)?);
            }
        }

        Ok(cmd_help)
    }

    fn convert_command(
        &self,
        descriptor: &CommandDescriptor,
        help: Vec<LegacyHelp>,
    ) -> anyhow::Result<CommandHelp> {
        let help_item = match help.len() {
            1 => help.into_iter().next(),
            0 => None,
            n => {
                log::warn!(
                    "{}: host returned {} help records, ignoring them",
                    descriptor.name,
                    n
                );
                None
            }
        };

        let mut cmd_help = convert_command_info(descriptor, help_item.as_ref())?;
        cmd_help.locale = self.locale.clone();

        Ok(cmd_help)
    }
}

/// Converts one descriptor and its optional help record.
///
/// A missing record, or one without description and examples, is replaced by
/// placeholder text so that every section of the page can be authored later.
pub fn convert_command_info(
    descriptor: &CommandDescriptor,
    help_item: Option<&LegacyHelp>,
) -> anyhow::Result<CommandHelp> {
    if descriptor.name.trim().is_empty() {
        return Err(
            PlatyError::ArgumentInvalid("command descriptor has no name".to_string()).into(),
        );
    }

    let add_default_strings = help_item.map_or(true, LegacyHelp::is_auto_generated);
    if add_default_strings {
        log::debug!("{}: no authored help, using placeholders", descriptor.name);
    }

    let mut cmd_help = CommandHelp::new(descriptor.name.clone(), descriptor.module_name.clone());
    cmd_help.module_guid = descriptor.module_guid;
    cmd_help.synopsis = get_synopsis(help_item, add_default_strings)?;
    cmd_help.add_syntax_item_range(get_syntax_items(descriptor, help_item));
    cmd_help.description = get_description(help_item, add_default_strings)?;
    cmd_help.add_example_range(get_examples(help_item, add_default_strings));
    cmd_help.add_parameter_range(get_parameters(descriptor, help_item));

    let (input_types, return_values) = if add_default_strings {
        (None, None)
    } else {
        (
            help_item.and_then(LegacyHelp::input_type_list),
            help_item.and_then(LegacyHelp::return_value_list),
        )
    };
    cmd_help.add_input(get_input_output(input_types, constants::NONE_STRING));
    cmd_help.add_output(get_input_output(return_values, constants::SYSTEM_OBJECT_TYPENAME));

    cmd_help.notes = get_notes(help_item, add_default_strings);
    cmd_help.add_related_link_range(get_related_links(help_item));
    cmd_help.backfill_parameters_from_syntax();

    Ok(cmd_help)
}

/// Joins description paragraphs, breaking lines after each sentence.
pub fn description_text(description: Option<&OneOrMany<TextBlock>>) -> String {
    description
        .map(|d| {
            d.as_slice()
                .iter()
                .filter_map(|line| line.text.as_deref())
                .map(|text| text.trim().replace(". ", ".\n"))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .unwrap_or_default()
}

fn get_synopsis(
    help_item: Option<&LegacyHelp>,
    add_default_strings: bool,
) -> anyhow::Result<String> {
    if add_default_strings {
        return Ok(constants::FILL_IN_SYNOPSIS.to_string());
    }

    let help_item = help_item.ok_or(PlatyError::MissingSourceData("synopsis"))?;
    Ok(help_item
        .synopsis
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string())
}

fn get_description(
    help_item: Option<&LegacyHelp>,
    add_default_strings: bool,
) -> anyhow::Result<String> {
    if add_default_strings {
        return Ok(constants::FILL_IN_DESCRIPTION.to_string());
    }

    let help_item = help_item.ok_or(PlatyError::MissingSourceData("description"))?;
    Ok(description_text(help_item.description.as_ref()))
}

fn get_notes(help_item: Option<&LegacyHelp>, add_default_strings: bool) -> String {
    if add_default_strings {
        return constants::FILL_IN_NOTES.to_string();
    }

    help_item
        .and_then(|h| h.alert_set.as_ref())
        .map(|a| description_text(a.alert.as_ref()))
        .unwrap_or_default()
}

/// Strips the decoration `Get-Help` puts around example titles:
/// `--- Example 1: Get a foo ---` becomes `Get a foo`.
pub fn clean_example_title(title: &str) -> String {
    let title = title.trim_matches(|c: char| c == '-' || c.is_whitespace());
    match Regex::new(r"(?i)^example\s+\d+\s*:?\s*") {
        Ok(label) => label.replace(title, "").trim().to_string(),
        Err(_) => title.to_string(),
    }
}

fn get_examples(help_item: Option<&LegacyHelp>, add_default_strings: bool) -> Vec<Example> {
    if add_default_strings {
        return vec![Example::new(
            constants::FILL_IN_EXAMPLE_TITLE,
            constants::FILL_IN_EXAMPLE_CODE,
            constants::FILL_IN_EXAMPLE_DESCRIPTION,
        )];
    }

    help_item
        .map(|h| {
            h.example_list()
                .iter()
                .map(|item| {
                    Example::new(
                        clean_example_title(item.title.as_deref().unwrap_or("")),
                        item.code.as_deref().unwrap_or("").trim(),
                        description_text(item.remarks.as_ref()),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn get_related_links(help_item: Option<&LegacyHelp>) -> Vec<Link> {
    help_item
        .map(|h| {
            h.navigation_link_list()
                .iter()
                .map(|link| {
                    Link::new(
                        link.uri.as_deref().unwrap_or("").trim(),
                        link.link_text.as_deref().unwrap_or("").trim(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn get_input_output(types: Option<&[LegacyTypeRecord]>, default_type_name: &str) -> InputOutput {
    let mut item = InputOutput::new();

    match types {
        Some(types) if !types.is_empty() => {
            for io_type in types {
                let type_name = io_type
                    .type_info
                    .as_ref()
                    .and_then(|t| t.name.as_deref())
                    .unwrap_or("")
                    .trim();
                item.add_input_output_item(
                    type_name,
                    description_text(io_type.description.as_ref()),
                );
            }
        }
        _ => item.add_input_output_item(default_type_name, ""),
    }

    item
}

fn get_parameter_description_from_help(help_item: Option<&LegacyHelp>, name: &str) -> String {
    let description = help_item
        .and_then(|h| h.parameter(name))
        .map(|p| description_text(p.description.as_ref()))
        .unwrap_or_default();

    if description.is_empty() {
        constants::fill_in_parameter_description(name)
    } else {
        description
    }
}

fn get_parameter_default_value_from_help(
    help_item: Option<&LegacyHelp>,
    name: &str,
) -> Option<String> {
    help_item
        .and_then(|h| h.parameter(name))
        .and_then(|p| p.default_value.as_deref())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Attributes shared by every copy of a parameter: name, type, text, sets and
/// parameter attributes.
fn base_parameter(
    descriptor: &CommandDescriptor,
    name: &str,
    help_item: Option<&LegacyHelp>,
) -> Parameter {
    let mut param = Parameter::new(name);
    param.description = get_parameter_description_from_help(help_item, name);
    param.default_value = get_parameter_default_value_from_help(help_item, name);

    if let Some(metadata) = descriptor.parameter(name) {
        param.parameter_type = metadata
            .parameter_type
            .as_ref()
            .map(|t| ParameterType::Resolved(t.clone()));
        param.aliases = metadata.aliases.clone();
        param.globbing = metadata.supports_wildcards;
        param.dont_show = metadata.dont_show;
        param.add_accepted_values(metadata.valid_values.iter().cloned());

        for set in &metadata.parameter_sets {
            param.add_parameter_set(set.name.clone());
            param.add_required_parameter_set(set.is_mandatory, set.name.clone());
        }
    }

    param
}

fn get_parameters(
    descriptor: &CommandDescriptor,
    help_item: Option<&LegacyHelp>,
) -> Vec<Parameter> {
    descriptor
        .parameters
        .iter()
        .map(|metadata| {
            let mut param = base_parameter(descriptor, &metadata.name, help_item);

            param.required = !metadata.parameter_sets.is_empty()
                && metadata.parameter_sets.iter().all(|s| s.is_mandatory);

            let first_set_info = descriptor
                .parameter_sets
                .iter()
                .flat_map(|set| set.parameters.iter())
                .find(|p| p.name.eq_ignore_ascii_case(&metadata.name));
            if let Some(info) = first_set_info {
                param.position = Position::from_host(info.position);
                param.pipeline_input =
                    info.value_from_pipeline || info.value_from_pipeline_by_property_name;
            }

            param
        })
        .collect()
}

fn get_syntax_items(
    descriptor: &CommandDescriptor,
    help_item: Option<&LegacyHelp>,
) -> Vec<SyntaxItem> {
    descriptor
        .parameter_sets
        .iter()
        .map(|set| {
            let mut syn = SyntaxItem::new(
                descriptor.name.clone(),
                Some(set.name.clone()),
                set.is_default,
            );

            for info in &set.parameters {
                let mut param = base_parameter(descriptor, &info.name, help_item);
                param.required = info.is_mandatory;
                param.position = Position::from_host(info.position);
                param.pipeline_input =
                    info.value_from_pipeline || info.value_from_pipeline_by_property_name;
                if param.default_value.is_none() {
                    param.default_value = Some(constants::NONE_STRING.to_string());
                }
                if descriptor.parameter(&info.name).is_none() {
                    param.add_parameter_set(set.name.clone());
                    param.add_required_parameter_set(info.is_mandatory, set.name.clone());
                }

                syn.add_parameter(param);
            }

            syn
        })
        .collect()
}
