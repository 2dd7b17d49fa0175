//! Recursive-descent grammar for MAML command help. Each `parse_*` function
//! handles one element type: it is called right after that element's start
//! tag and returns once its end tag has been consumed.

use super::reader::{StartTag, TokenReader};
use crate::constants::*;
use crate::error::PlatyError;
use crate::model::{
    CommandHelp, Example, InputOutput, Link, Parameter, ParameterType, SyntaxItem,
};
use crate::transform_command::clean_example_title;
use crate::types;
use std::io::Read;

/// Every command in one document, in document order.
pub fn parse_document<R: Read>(source: R) -> anyhow::Result<Vec<CommandHelp>> {
    let mut reader = TokenReader::new(source);
    let root = reader.read_root()?;

    let mut commands = Vec::new();
    if root.name == MAML_COMMAND_TAG {
        commands.push(parse_command(&mut reader)?);
        return Ok(commands);
    }

    while reader.read_to_following(MAML_COMMAND_TAG)?.is_some() {
        commands.push(parse_command(&mut reader)?);
    }

    Ok(commands)
}

/// Paragraphs, each followed by a blank line, trailing blank lines removed.
fn join_paragraphs(paragraphs: Vec<String>) -> String {
    let mut text = String::new();
    for para in paragraphs.iter().filter(|p| !p.is_empty()) {
        text.push_str(para);
        text.push_str("\n\n");
    }
    text.trim_end_matches(['\r', '\n']).to_string()
}

fn read_trimmed<R: Read>(reader: &mut TokenReader<R>) -> anyhow::Result<String> {
    Ok(reader.read_element_text()?.trim().to_string())
}

fn skip_unknown<R: Read>(
    reader: &mut TokenReader<R>,
    parent: &str,
    child: &StartTag,
) -> anyhow::Result<()> {
    log::trace!("skipping <{}> in <{}>", child.name, parent);
    reader.skip_element()
}

fn parse_command<R: Read>(reader: &mut TokenReader<R>) -> anyhow::Result<CommandHelp> {
    let mut cmd_help = CommandHelp::default();
    let mut title = None;
    let mut syntax = Vec::new();
    let mut parameters = Vec::new();

    while let Some(child) = reader.next_child()? {
        match child.name.as_str() {
            MAML_DETAILS_TAG => {
                let (name, synopsis) = parse_details(reader)?;
                title = name;
                cmd_help.synopsis = synopsis.unwrap_or_default();
            }
            MAML_DESCRIPTION_TAG => {
                cmd_help.description = join_paragraphs(parse_paragraphs(reader)?)
            }
            MAML_SYNTAX_TAG => syntax.extend(parse_syntax(reader)?),
            MAML_PARAMETERS_TAG => parameters = parse_parameters(reader)?,
            MAML_INPUT_TYPES_TAG => {
                cmd_help.add_input(parse_type_records(reader, MAML_INPUT_TYPE_TAG)?)
            }
            MAML_RETURN_VALUES_TAG => {
                cmd_help.add_output(parse_type_records(reader, MAML_RETURN_VALUE_TAG)?)
            }
            MAML_ALERT_SET_TAG => cmd_help.notes = parse_alert_set(reader)?,
            MAML_EXAMPLES_TAG => cmd_help.add_example_range(parse_examples(reader)?),
            MAML_RELATED_LINKS_TAG => cmd_help.add_related_link_range(parse_related_links(reader)?),
            _ => skip_unknown(reader, MAML_COMMAND_TAG, &child)?,
        }
    }

    cmd_help.title = title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| PlatyError::StructuralParse("command element has no name".to_string()))?;

    for item in syntax.iter_mut().filter(|s| s.command_name.is_empty()) {
        item.command_name = cmd_help.title.clone();
    }
    cmd_help.add_syntax_item_range(syntax);
    cmd_help.add_parameter_range(parameters);
    cmd_help.backfill_parameters_from_syntax();

    Ok(cmd_help)
}

/// Name and synopsis (first paragraph of the description)
fn parse_details<R: Read>(
    reader: &mut TokenReader<R>,
) -> anyhow::Result<(Option<String>, Option<String>)> {
    let mut name = None;
    let mut synopsis = None;

    while let Some(child) = reader.next_child()? {
        match child.name.as_str() {
            MAML_NAME_TAG => name = Some(read_trimmed(reader)?),
            MAML_DESCRIPTION_TAG => {
                synopsis = parse_paragraphs(reader)?.into_iter().next();
            }
            _ => skip_unknown(reader, MAML_DETAILS_TAG, &child)?,
        }
    }

    Ok((name, synopsis))
}

/// Text of each direct `para` child
fn parse_paragraphs<R: Read>(reader: &mut TokenReader<R>) -> anyhow::Result<Vec<String>> {
    let mut paragraphs = Vec::new();
    while reader.next_sibling(MAML_PARA_TAG)?.is_some() {
        paragraphs.push(read_trimmed(reader)?);
    }
    Ok(paragraphs)
}

fn parse_syntax<R: Read>(reader: &mut TokenReader<R>) -> anyhow::Result<Vec<SyntaxItem>> {
    let mut items = Vec::new();
    while reader.next_sibling(MAML_SYNTAX_ITEM_TAG)?.is_some() {
        items.push(parse_syntax_item(reader)?);
    }
    Ok(items)
}

/// MAML carries no parameter set names, so every item is unnamed.
fn parse_syntax_item<R: Read>(reader: &mut TokenReader<R>) -> anyhow::Result<SyntaxItem> {
    let mut syntax_item = SyntaxItem::new(String::new(), None, false);

    while let Some(child) = reader.next_child()? {
        match child.name.as_str() {
            MAML_NAME_TAG => syntax_item.command_name = read_trimmed(reader)?,
            MAML_PARAMETER_TAG => syntax_item.add_parameter(parse_parameter(reader, &child)?),
            _ => skip_unknown(reader, MAML_SYNTAX_ITEM_TAG, &child)?,
        }
    }

    Ok(syntax_item)
}

fn parse_parameters<R: Read>(reader: &mut TokenReader<R>) -> anyhow::Result<Vec<Parameter>> {
    let mut parameters = Vec::new();
    while let Some(tag) = reader.next_sibling(MAML_PARAMETER_TAG)? {
        parameters.push(parse_parameter(reader, &tag)?);
    }
    Ok(parameters)
}

fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_aliases(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case(NONE_STRING))
        .map(str::to_string)
        .collect()
}

fn parse_parameter<R: Read>(
    reader: &mut TokenReader<R>,
    tag: &StartTag,
) -> anyhow::Result<Parameter> {
    let mut parameter = Parameter::default();

    if let Some(required) = tag.attribute("required").and_then(parse_bool) {
        parameter.required = required;
    }
    if let Some(variable_length) = tag.attribute("variableLength").and_then(parse_bool) {
        parameter.variable_length = variable_length;
    }
    if let Some(globbing) = tag.attribute("globbing").and_then(parse_bool) {
        parameter.globbing = globbing;
    }
    if let Some(pipeline_input) = tag.attribute("pipelineInput") {
        // 'True (ByPropertyName, ByValue)' or 'False'
        parameter.pipeline_input = pipeline_input
            .trim()
            .get(..TRUE_STRING.len())
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case(TRUE_STRING));
    }
    if let Some(position) = tag.attribute("position") {
        match position.parse() {
            Ok(position) => parameter.position = position,
            Err(e) => log::warn!("{}, treating the parameter as named", e),
        }
    }
    if let Some(aliases) = tag.attribute("aliases") {
        parameter.aliases = parse_aliases(aliases);
    }

    while let Some(child) = reader.next_child()? {
        match child.name.as_str() {
            MAML_NAME_TAG => parameter.name = read_trimmed(reader)?,
            MAML_DESCRIPTION_TAG => {
                parameter.description = join_paragraphs(parse_paragraphs(reader)?)
            }
            MAML_PARAMETER_VALUE_GROUP_TAG => {
                while reader.next_sibling(MAML_PARAMETER_VALUE_TAG)?.is_some() {
                    parameter.add_accepted_value(read_trimmed(reader)?);
                }
            }
            MAML_TYPE_TAG => parameter.parameter_type = parse_parameter_type(reader)?,
            MAML_DEFAULT_VALUE_TAG => {
                let default_value = read_trimmed(reader)?;
                if !default_value.is_empty() {
                    parameter.default_value = Some(default_value);
                }
            }
            _ => skip_unknown(reader, MAML_PARAMETER_TAG, &child)?,
        }
    }

    Ok(parameter)
}

/// Name inside a `type` element, as written
fn parse_type_name<R: Read>(reader: &mut TokenReader<R>) -> anyhow::Result<Option<String>> {
    let mut name = None;
    while let Some(child) = reader.next_child()? {
        match child.name.as_str() {
            MAML_NAME_TAG => name = Some(read_trimmed(reader)?).filter(|n| !n.is_empty()),
            _ => skip_unknown(reader, MAML_TYPE_TAG, &child)?,
        }
    }
    Ok(name)
}

fn parse_parameter_type<R: Read>(
    reader: &mut TokenReader<R>,
) -> anyhow::Result<Option<ParameterType>> {
    Ok(parse_type_name(reader)?.map(|name| match types::resolve(&name) {
        Some(full_name) => ParameterType::Resolved(full_name),
        None => {
            log::debug!("unresolved parameter type '{}'", name);
            ParameterType::Unresolved(name)
        }
    }))
}

fn parse_type_records<R: Read>(
    reader: &mut TokenReader<R>,
    record_tag: &str,
) -> anyhow::Result<InputOutput> {
    let mut input_output = InputOutput::new();

    while reader.next_sibling(record_tag)?.is_some() {
        let mut type_name = None;
        let mut description = String::new();
        while let Some(child) = reader.next_child()? {
            match child.name.as_str() {
                MAML_TYPE_TAG => type_name = parse_type_name(reader)?,
                MAML_DESCRIPTION_TAG => description = join_paragraphs(parse_paragraphs(reader)?),
                _ => skip_unknown(reader, record_tag, &child)?,
            }
        }

        if let Some(type_name) = type_name {
            input_output.add_input_output_item(type_name, description);
        }
    }

    Ok(input_output)
}

fn parse_alert_set<R: Read>(reader: &mut TokenReader<R>) -> anyhow::Result<String> {
    let mut paragraphs = Vec::new();
    while reader.next_sibling(MAML_ALERT_TAG)?.is_some() {
        paragraphs.extend(parse_paragraphs(reader)?);
    }
    Ok(join_paragraphs(paragraphs))
}

fn parse_examples<R: Read>(reader: &mut TokenReader<R>) -> anyhow::Result<Vec<Example>> {
    let mut examples = Vec::new();

    while reader.next_sibling(MAML_EXAMPLE_TAG)?.is_some() {
        let mut example = Example::default();
        while let Some(child) = reader.next_child()? {
            match child.name.as_str() {
                MAML_TITLE_TAG => example.title = clean_example_title(&reader.read_element_text()?),
                MAML_CODE_TAG => {
                    example.code = reader
                        .read_element_text()?
                        .trim_matches(['\r', '\n'])
                        .to_string()
                }
                MAML_REMARKS_TAG => example.remarks = join_paragraphs(parse_paragraphs(reader)?),
                _ => skip_unknown(reader, MAML_EXAMPLE_TAG, &child)?,
            }
        }
        examples.push(example);
    }

    Ok(examples)
}

fn parse_related_links<R: Read>(reader: &mut TokenReader<R>) -> anyhow::Result<Vec<Link>> {
    let mut links = Vec::new();

    while reader.next_sibling(MAML_NAVIGATION_LINK_TAG)?.is_some() {
        let mut link = Link::default();
        while let Some(child) = reader.next_child()? {
            match child.name.as_str() {
                MAML_LINK_TEXT_TAG => link.link_text = read_trimmed(reader)?,
                MAML_URI_TAG => link.uri = read_trimmed(reader)?,
                _ => skip_unknown(reader, MAML_NAVIGATION_LINK_TAG, &child)?,
            }
        }
        links.push(link);
    }

    Ok(links)
}
