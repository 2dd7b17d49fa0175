//! Landing page listing every command of a module.

use crate::constants::*;
use crate::error::PlatyError;
use crate::markdown_writer::{write_file, WriterSettings};
use crate::model::CommandHelp;
use anyhow::Context;
use std::path::PathBuf;

pub struct ModulePageWriter {
    settings: WriterSettings,
}

impl ModulePageWriter {
    pub fn new(settings: WriterSettings) -> Self {
        ModulePageWriter { settings }
    }

    /// The destination is used as is when it names a `.md` file, otherwise it
    /// is taken as a directory and the page becomes `<Module>.md` inside it.
    pub fn page_path(&self, module_name: &str) -> PathBuf {
        let destination = &self.settings.destination;
        let is_markdown = destination
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(MARKDOWN_EXTENSION))
            .unwrap_or(false);

        if is_markdown {
            destination.clone()
        } else {
            destination.join(format!("{}.{}", module_name, MARKDOWN_EXTENSION))
        }
    }

    /// Writes the page for `commands`, which must all come from one module.
    /// The module name and guid are taken from the first command.
    pub fn write(&self, commands: &[CommandHelp]) -> anyhow::Result<PathBuf> {
        let first = commands.first().ok_or_else(|| {
            PlatyError::ArgumentInvalid("no commands to write a module page for".to_string())
        })?;

        let path = self.page_path(&first.module_name);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("could not create directory: {}", parent.to_string_lossy())
                })?;
            }
        }

        write_file(&path, &render(commands)?)?;
        log::info!(
            "{}: wrote module page for {} commands",
            path.to_string_lossy(),
            commands.len()
        );
        Ok(path)
    }
}

pub fn render(commands: &[CommandHelp]) -> anyhow::Result<String> {
    let first = commands.first().ok_or_else(|| {
        PlatyError::ArgumentInvalid("no commands to write a module page for".to_string())
    })?;
    let module = &first.module_name;
    let guid = first
        .module_guid
        .map(|g| g.to_string())
        .unwrap_or_else(|| FILL_IN_GUID.to_string());

    let mut sections = vec![
        [
            YML_HEADER.to_string(),
            format!("Module Name: {}", module),
            format!("Module Guid: {}", guid),
            format!("Download Help Link: {}", FILL_DOWNLOAD_HELP_LINK),
            format!("Help Version: {}", FILL_HELP_VERSION),
            format!("Locale: {}", first.locale),
            YML_HEADER.to_string(),
        ]
        .join("\n"),
        format!("# {} Module", module),
        format!("## Description\n\n{}", FILL_IN_DESCRIPTION),
        format!("## {} Cmdlets", module),
    ];
    for command in commands {
        sections.push(format!(
            "### [{title}]({title}.{ext})\n\n{}",
            FILL_IN_DESCRIPTION,
            title = command.title,
            ext = MARKDOWN_EXTENSION
        ));
    }

    let mut page = sections.join("\n\n");
    page.push('\n');
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn commands() -> Vec<CommandHelp> {
        ["Get-Foo", "Set-Foo"]
            .iter()
            .map(|t| CommandHelp::new(*t, "FooModule"))
            .collect()
    }

    #[test]
    fn renders_index() {
        let mut commands = commands();
        commands[0].module_guid =
            Some(Uuid::parse_str("6f2b8b3a-4c1f-4f7e-9d6e-0a1b2c3d4e5f").unwrap());

        let expected = "---
Module Name: FooModule
Module Guid: 6f2b8b3a-4c1f-4f7e-9d6e-0a1b2c3d4e5f
Download Help Link: {{ Update Download Link }}
Help Version: {{ Please enter version of help manually (X.X.X.X) format }}
Locale: en-US
---

# FooModule Module

## Description

{{ Fill in the Description }}

## FooModule Cmdlets

### [Get-Foo](Get-Foo.md)

{{ Fill in the Description }}

### [Set-Foo](Set-Foo.md)

{{ Fill in the Description }}
";
        assert_eq!(render(&commands).unwrap(), expected);
    }

    #[test]
    fn missing_guid_gets_placeholder() {
        let page = render(&commands()).unwrap();
        assert!(page.contains("Module Guid: {{ Fill in the Guid }}\n"));
    }

    #[test]
    fn destination_without_md_extension_is_a_directory() {
        let writer = ModulePageWriter::new(WriterSettings::new("out/docs").unwrap());
        assert_eq!(writer.page_path("FooModule"), PathBuf::from("out/docs/FooModule.md"));

        let writer = ModulePageWriter::new(WriterSettings::new("out/index.MD").unwrap());
        assert_eq!(writer.page_path("FooModule"), PathBuf::from("out/index.MD"));
    }

    #[test]
    fn empty_collection_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ModulePageWriter::new(WriterSettings::new(dir.path()).unwrap());
        let err = writer.write(&[]).unwrap_err();
        assert!(PlatyError::is_argument_invalid(&err));
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("a").join("b");
        let writer = ModulePageWriter::new(WriterSettings::new(&destination).unwrap());

        let path = writer.write(&commands()).unwrap();
        assert_eq!(path, destination.join("FooModule.md"));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            render(&commands()).unwrap()
        );
    }
}
