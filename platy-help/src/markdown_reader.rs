//! Reads a command page produced by `markdown_writer` back into the model.

use crate::constants::*;
use crate::error::PlatyError;
use crate::model::{
    CommandHelp, Example, InputOutput, Link, Parameter, ParameterType, Position, SyntaxItem,
};
use crate::types;
use anyhow::Context;
use comrak::nodes::{AstNode, NodeCode, NodeCodeBlock, NodeHeading, NodeLink, NodeValue};
use regex::Regex;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum Section {
    None,
    Synopsis,
    Syntax,
    Description,
    Examples,
    Parameters,
    Inputs,
    Outputs,
    Notes,
    RelatedLinks,
    Unknown,
}

impl Section {
    fn from_heading(heading: &str) -> Section {
        match heading.trim().to_ascii_uppercase().as_str() {
            "SYNOPSIS" => Section::Synopsis,
            "SYNTAX" => Section::Syntax,
            "DESCRIPTION" => Section::Description,
            "EXAMPLES" => Section::Examples,
            "PARAMETERS" => Section::Parameters,
            "INPUTS" => Section::Inputs,
            "OUTPUTS" => Section::Outputs,
            "NOTES" => Section::Notes,
            "RELATED LINKS" => Section::RelatedLinks,
            _ => Section::Unknown,
        }
    }
}

/// Splits `---` delimited front matter from the markdown body.
fn split_front_matter(text: &str) -> anyhow::Result<(&str, &str)> {
    // comrak doesn't support yaml metadata, so hack around it...
    let mut found = 0;
    let mut yaml_start_idx = 0;
    for (idx, _) in text.match_indices(YML_HEADER) {
        if found == 0 && idx != 0 {
            return Err(
                PlatyError::StructuralParse("missing front matter start".to_string()).into(),
            );
        }
        let at_line_start = idx == 0 || text[..idx].ends_with('\n');
        let rest = &text[idx + YML_HEADER.len()..];
        let line_end = if rest.starts_with("\r\n") {
            Some(2)
        } else if rest.starts_with('\n') {
            Some(1)
        } else {
            None
        };
        if let (true, Some(add)) = (at_line_start, line_end) {
            found += 1;
            let after = idx + YML_HEADER.len() + add;
            if found == 2 {
                return Ok((&text[yaml_start_idx..idx], &text[after..]));
            }
            yaml_start_idx = after;
        }
    }

    if found == 0 {
        Err(PlatyError::StructuralParse("missing front matter start".to_string()).into())
    } else {
        Err(PlatyError::StructuralParse("missing front matter end".to_string()).into())
    }
}

fn iter_nodes<'a, F>(node: &'a AstNode<'a>, f: &mut F)
where
    F: FnMut(&'a AstNode<'a>),
{
    f(node);
    for c in node.children() {
        iter_nodes(c, f);
    }
}

/// Inline content of a block, re-emitting the markdown for code spans,
/// emphasis and links.
fn inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(t) => text.push_str(t),
            NodeValue::Code(NodeCode { literal, .. }) => {
                text.push('`');
                text.push_str(literal);
                text.push('`');
            }
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
            NodeValue::Emph => text.push_str(&format!("*{}*", inline_text(child))),
            NodeValue::Strong => text.push_str(&format!("**{}**", inline_text(child))),
            NodeValue::Link(NodeLink { url, .. }) => {
                text.push_str(&format!("[{}]({})", inline_text(child), url))
            }
            _ => text.push_str(&inline_text(child)),
        }
    }
    text
}

/// Plain text of every paragraph and heading below `node`.
fn block_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut lines = Vec::new();
    iter_nodes(node, &mut |n| {
        if let NodeValue::Paragraph | NodeValue::Heading(_) = n.data.borrow().value {
            lines.push(inline_text(n));
        }
    });
    lines.join("\n")
}

fn push_paragraph(target: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push_str("\n\n");
    }
    target.push_str(text);
}

fn parse_flag(value: &str) -> bool {
    value.trim().to_ascii_lowercase().starts_with(TRUE_STRING)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Parameter-set names of a parameter, `None` meaning every set.
type ParameterSets = Option<Vec<String>>;

/// Applies one line of a parameter's yaml block. The block is read line by
/// line since values like `{{ ... }}` or `@{}` are not valid yaml.
fn apply_metadata_line(param: &mut Parameter, sets: &mut ParameterSets, line: &str) {
    let (key, value) = match line.split_once(':') {
        Some((k, v)) => (k.trim(), v.trim()),
        None => return,
    };

    match key.to_ascii_lowercase().as_str() {
        "type" if !value.is_empty() => {
            let full = types::resolve(value).unwrap_or_else(|| value.to_string());
            param.parameter_type = Some(ParameterType::Resolved(full));
        }
        "parameter sets" => {
            *sets = if value.eq_ignore_ascii_case("(All)") {
                None
            } else {
                Some(split_list(value))
            };
        }
        "aliases" => param.aliases = split_list(value),
        "accepted values" => param.add_accepted_values(split_list(value)),
        "required" => param.required = parse_flag(value),
        "position" => match value.parse::<Position>() {
            Ok(position) => param.position = position,
            Err(e) => log::warn!("-{}: {}", param.name, e),
        },
        "default value" => {
            param.default_value = if value.is_empty() || value.eq_ignore_ascii_case(NONE_STRING) {
                None
            } else {
                Some(value.to_string())
            }
        }
        "accept pipeline input" => param.pipeline_input = parse_flag(value),
        "accept wildcard characters" => param.globbing = parse_flag(value),
        _ => log::trace!("-{}: ignoring metadata key {}", param.name, key),
    }
}

struct PendingSyntax {
    set_name: Option<String>,
    is_default: bool,
    signature: String,
}

#[derive(Default)]
struct Builder {
    title: Option<String>,
    synopsis: String,
    description: String,
    notes: String,
    syntax: Vec<PendingSyntax>,
    examples: Vec<Example>,
    parameters: Vec<(Parameter, ParameterSets)>,
    inputs: Vec<(String, String)>,
    outputs: Vec<(String, String)>,
    links: Vec<Link>,
    in_common_parameters: bool,
}

impl Builder {
    fn heading(&mut self, section: Section, text: String) {
        let text = text.trim().to_string();
        self.in_common_parameters = false;
        match section {
            Section::Syntax => {
                let (set_name, is_default) = match text.strip_suffix("(Default)") {
                    Some(name) => (name.trim().to_string(), true),
                    None => (text, false),
                };
                // several unnamed sets are written as `__AllParameterSets 1`, `2`, ...
                let is_unnamed = set_name
                    .strip_prefix(ALL_PARAMETER_SETS)
                    .map_or(false, |n| n.trim().chars().all(|c| c.is_ascii_digit()));
                let set_name = if is_unnamed {
                    None
                } else {
                    Some(set_name)
                };
                self.syntax.push(PendingSyntax {
                    set_name,
                    is_default,
                    signature: String::new(),
                });
            }
            Section::Examples => {
                let title = match text.split_once(':') {
                    Some((_, title)) => title.trim().to_string(),
                    None => String::new(),
                };
                self.examples.push(Example::new(title, "", ""));
            }
            Section::Parameters => match text.strip_prefix('-') {
                Some(name) => self.parameters.push((Parameter::new(name.trim()), None)),
                None => self.in_common_parameters = true,
            },
            Section::Inputs => self.inputs.push((text, String::new())),
            Section::Outputs => self.outputs.push((text, String::new())),
            _ => log::trace!("ignoring heading {}", text),
        }
    }

    fn paragraph<'a>(&mut self, section: Section, node: &'a AstNode<'a>) {
        let text = inline_text(node);
        match section {
            Section::Synopsis => push_paragraph(&mut self.synopsis, &text),
            Section::Description => push_paragraph(&mut self.description, &text),
            Section::Notes => push_paragraph(&mut self.notes, &text),
            Section::Examples => {
                if let Some(example) = self.examples.last_mut() {
                    push_paragraph(&mut example.remarks, &text);
                }
            }
            Section::Parameters if !self.in_common_parameters => {
                if let Some((param, _)) = self.parameters.last_mut() {
                    push_paragraph(&mut param.description, &text);
                }
            }
            Section::Inputs | Section::Outputs => {
                let items = if section == Section::Inputs {
                    &mut self.inputs
                } else {
                    &mut self.outputs
                };
                if let Some((_, description)) = items.last_mut() {
                    push_paragraph(description, &text);
                }
            }
            Section::RelatedLinks => {
                iter_nodes(node, &mut |n| {
                    if let NodeValue::Link(NodeLink { url, .. }) = &n.data.borrow().value {
                        self.links.push(Link::new(url.clone(), inline_text(n)));
                    }
                });
            }
            _ => {}
        }
    }

    fn code_block(&mut self, section: Section, block: &NodeCodeBlock) {
        let literal = block.literal.trim_end_matches(['\r', '\n']);
        match section {
            Section::Syntax => {
                if let Some(item) = self.syntax.last_mut() {
                    item.signature = literal.to_string();
                }
            }
            Section::Examples => {
                if let Some(example) = self.examples.last_mut() {
                    if example.code.is_empty() {
                        example.code = literal.to_string();
                    } else {
                        push_paragraph(&mut example.code, literal);
                    }
                }
            }
            Section::Parameters if !self.in_common_parameters => {
                if let Some((param, sets)) = self.parameters.last_mut() {
                    for line in literal.lines() {
                        apply_metadata_line(param, sets, line);
                    }
                }
            }
            _ => {}
        }
    }

    fn build(self, module_name: String) -> anyhow::Result<CommandHelp> {
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PlatyError::StructuralParse("page has no title".to_string()))?;

        let mut help = CommandHelp::new(title, module_name);
        help.synopsis = self.synopsis;
        help.description = self.description;
        help.notes = self.notes;

        let all_sets: Vec<String> = self
            .syntax
            .iter()
            .filter_map(|s| s.set_name.clone())
            .collect();
        for (mut param, sets) in self.parameters {
            let sets = sets.unwrap_or_else(|| all_sets.clone());
            for set in sets {
                param.add_required_parameter_set(param.required, set.clone());
                param.add_parameter_set(set);
            }
            help.add_parameter(param);
        }

        for pending in self.syntax {
            let mut item =
                SyntaxItem::new(help.title.clone(), pending.set_name, pending.is_default);
            let mut positional_seen = 0;
            for entry in signature_parameters(&pending.signature) {
                let mut param = help
                    .parameter(&entry.name)
                    .cloned()
                    .unwrap_or_else(|| Parameter::new(entry.name));
                param.required = entry.required;
                // the signature only gives the order of positional parameters
                param.position = match (entry.positional, param.position) {
                    (false, _) => Position::Named,
                    (true, Position::Index(p)) => Position::Index(p),
                    (true, Position::Named) => Position::Index(positional_seen),
                };
                if entry.positional {
                    positional_seen += 1;
                }
                item.add_parameter(param);
            }
            help.add_syntax_item(item);
        }
        help.backfill_parameters_from_syntax();

        help.add_example_range(self.examples);
        if !self.inputs.is_empty() {
            help.add_input(input_output(self.inputs));
        }
        if !self.outputs.is_empty() {
            help.add_output(input_output(self.outputs));
        }
        help.add_related_link_range(self.links);
        Ok(help)
    }
}

fn input_output(items: Vec<(String, String)>) -> InputOutput {
    let mut io = InputOutput::new();
    for (type_name, description) in items {
        io.add_input_output_item(type_name, description);
    }
    io
}

/// One parameter as written in a syntax line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParameter {
    pub name: String,
    /// Required in this parameter set
    pub required: bool,
    /// Written with a bracketed name, ie. `[-Name] <T>`
    pub positional: bool,
}

impl SignatureParameter {
    fn new(name: &str, required: bool, positional: bool) -> Self {
        SignatureParameter {
            name: name.to_string(),
            required,
            positional,
        }
    }
}

/// Parameters of a syntax line, in order.
pub fn signature_parameters(signature: &str) -> Vec<SignatureParameter> {
    let re = match Regex::new(concat!(
        r"\[\[-(?P<op>\w+)\] <[^>]+>\]",
        r"|\[-(?P<rp>\w+)\] <[^>]+>",
        r"|\[-(?P<on>\w+)(?: <[^>]+>)?\]",
        r"|-(?P<rn>\w+)(?: <[^>]+>)?",
    )) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    // skip the command name, it contains a dash too
    let arguments = match signature.trim().split_once(char::is_whitespace) {
        Some((_, rest)) => rest,
        None => return Vec::new(),
    };

    re.captures_iter(arguments)
        .filter_map(|c| {
            if let Some(m) = c.name("op") {
                Some(SignatureParameter::new(m.as_str(), false, true))
            } else if let Some(m) = c.name("rp") {
                Some(SignatureParameter::new(m.as_str(), true, true))
            } else if let Some(m) = c.name("on") {
                Some(SignatureParameter::new(m.as_str(), false, false))
            } else {
                c.name("rn")
                    .map(|m| SignatureParameter::new(m.as_str(), true, false))
            }
        })
        .collect()
}

/// Parses the text of a command page.
pub fn read_markdown(text: &str) -> anyhow::Result<CommandHelp> {
    let (yaml, body) = split_front_matter(text)?;

    let metadata = yaml_rust::YamlLoader::load_from_str(yaml)
        .map_err(|e| PlatyError::StructuralParse(format!("invalid front matter: {}", e)))?;
    let module_name = metadata
        .first()
        .and_then(|m| m["Module Name"].as_str())
        .unwrap_or("")
        .to_string();

    let arena = comrak::Arena::new();
    let doc = comrak::parse_document(&arena, body, &comrak::ComrakOptions::default());

    let mut builder = Builder::default();
    let mut section = Section::None;
    for node in doc.children() {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Heading(NodeHeading { level: 1, .. }) => {
                if builder.title.is_none() {
                    builder.title = Some(inline_text(node).trim().to_string());
                }
            }
            NodeValue::Heading(NodeHeading { level: 2, .. }) => {
                section = Section::from_heading(&inline_text(node));
            }
            NodeValue::Heading(_) => builder.heading(section, inline_text(node)),
            NodeValue::Paragraph => builder.paragraph(section, node),
            NodeValue::CodeBlock(ref block) => builder.code_block(section, block),
            _ => {
                let text = block_text(node);
                match section {
                    Section::Description => push_paragraph(&mut builder.description, &text),
                    Section::Notes => push_paragraph(&mut builder.notes, &text),
                    _ => {}
                }
            }
        }
    }

    builder.build(module_name)
}

pub fn read_file<P: AsRef<Path>>(path: P) -> anyhow::Result<CommandHelp> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("could not open: {}", path.to_string_lossy()))?;
    let mut buf_reader = BufReader::new(file);
    let mut text = String::new();
    buf_reader.read_to_string(&mut text)?;

    read_markdown(&text).with_context(|| format!("failed to read: {}", path.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"---
external help file: FooModule-help.xml
Module Name: FooModule
online version:
schema: 2.0.0
---

# Get-Foo

## SYNOPSIS

Gets foo.

## SYNTAX

### ByName (Default)

```
Get-Foo [-Name] <String> [-Force] [<CommonParameters>]
```

### ById

```
Get-Foo [[-Count] <Int32>] -Id <Int32> [<CommonParameters>]
```

## DESCRIPTION

Do this.
Then `that`.

## EXAMPLES

### Example 1: Get a foo

```powershell
Get-Foo -Name bar
```

Gets bar.

### Example 2

```powershell
Get-Foo
```

## PARAMETERS

### -Name

The name.

```yaml
Type: String
Parameter Sets: ByName
Aliases: N, FooName

Required: True
Position: 0
Default value: None
Accept pipeline input: True (ByPropertyName)
Accept wildcard characters: False
```

### -Force

```yaml
Type: SwitchParameter
Parameter Sets: (All)
Aliases:

Required: False
Position: Named
Default value: False
Accept pipeline input: False
Accept wildcard characters: False
```

### CommonParameters

This cmdlet supports the common parameters.

## INPUTS

### System.String

A name.

## OUTPUTS

### System.Object

## NOTES

## RELATED LINKS

[Online Version:](https://example.com/get-foo)

[Set-Foo]()
"#;

    #[test]
    fn reads_command_page() {
        let help = read_markdown(PAGE).unwrap();
        assert_eq!(help.title, "Get-Foo");
        assert_eq!(help.module_name, "FooModule");
        assert_eq!(help.synopsis, "Gets foo.");
        assert_eq!(help.description, "Do this.\nThen `that`.");
        assert_eq!(help.notes, "");

        let name = help.parameter("Name").unwrap();
        assert_eq!(name.type_name(), Some("System.String"));
        assert!(name.required);
        assert!(name.pipeline_input);
        assert_eq!(name.position, Position::Index(0));
        assert_eq!(name.aliases, vec!["N", "FooName"]);
        assert_eq!(name.description, "The name.");
        assert_eq!(name.parameter_sets(), ["ByName"]);

        let force = help.parameter("Force").unwrap();
        assert!(force.is_switch());
        assert_eq!(force.default_value.as_deref(), Some("False"));
        assert_eq!(force.parameter_sets(), ["ByName", "ById"]);

        // only seen in a signature
        let count = help.parameter("Count").unwrap();
        assert!(!count.required);

        assert_eq!(help.syntax().len(), 2);
        assert!(help.syntax()[0].is_default_parameter_set);
        let by_id: Vec<(&str, bool)> = help.syntax()[1]
            .parameters()
            .iter()
            .map(|p| (p.name.as_str(), p.required))
            .collect();
        assert_eq!(by_id, vec![("Count", false), ("Id", true)]);

        assert_eq!(help.examples().len(), 2);
        assert_eq!(help.examples()[0].title, "Get a foo");
        assert_eq!(help.examples()[0].code, "Get-Foo -Name bar");
        assert_eq!(help.examples()[0].remarks, "Gets bar.");
        assert_eq!(help.examples()[1].title, "");

        assert_eq!(
            help.inputs()[0].items(),
            [("System.String".to_string(), "A name.".to_string())]
        );
        assert_eq!(help.outputs()[0].items(), [("System.Object".to_string(), String::new())]);

        assert_eq!(
            help.related_links(),
            [
                Link::new("https://example.com/get-foo", "Online Version:"),
                Link::new("", "Set-Foo"),
            ]
        );
    }

    #[test]
    fn signatures() {
        let parsed = signature_parameters(
            "Get-Foo [-Name] <String> [-Force] -Path <String> -Confirm [[-X] <Int32>] [<CommonParameters>]",
        );
        assert_eq!(
            parsed,
            vec![
                SignatureParameter::new("Name", true, true),
                SignatureParameter::new("Force", false, false),
                SignatureParameter::new("Path", true, false),
                SignatureParameter::new("Confirm", true, false),
                SignatureParameter::new("X", false, true),
            ]
        );
        assert!(signature_parameters("Get-Foo").is_empty());
    }

    #[test]
    fn syntax_positions_are_per_set() {
        let page = "---\nModule Name: FooModule\n---\n\n# Get-Foo\n\n## SYNTAX\n\n\
            ### ByName (Default)\n\n```\nGet-Foo -Id <Int32> [-Name <String>] [<CommonParameters>]\n```\n\n\
            ### ById\n\n```\nGet-Foo [-Id] <Int32> [[-Name] <String>] [<CommonParameters>]\n```\n\n\
            ### __AllParameterSets 1\n\n```\nGet-Foo [-Widget] <Object> [<CommonParameters>]\n```\n";
        let help = read_markdown(page).unwrap();

        let entries: Vec<Vec<(String, bool, Position)>> = help
            .syntax()
            .iter()
            .map(|item| {
                item.parameters()
                    .iter()
                    .map(|p| (p.name.clone(), p.required, p.position))
                    .collect()
            })
            .collect();
        assert_eq!(
            entries,
            vec![
                vec![
                    ("Id".to_string(), true, Position::Named),
                    ("Name".to_string(), false, Position::Named),
                ],
                vec![
                    ("Id".to_string(), true, Position::Index(0)),
                    ("Name".to_string(), false, Position::Index(1)),
                ],
                vec![("Widget".to_string(), true, Position::Index(0))],
            ]
        );
        assert_eq!(help.syntax()[2].parameter_set_name, None);
    }

    #[test]
    fn missing_front_matter() {
        let err = read_markdown("# Get-Foo\n").unwrap_err();
        assert!(PlatyError::is_structural(&err));

        let err = read_markdown("---\nModule Name: X\n# Get-Foo\n").unwrap_err();
        assert!(PlatyError::is_structural(&err));
    }

    #[test]
    fn missing_title() {
        let err =
            read_markdown("---\nModule Name: X\n---\n\n## SYNOPSIS\n\nNothing.\n").unwrap_err();
        assert!(PlatyError::is_structural(&err));
    }
}
