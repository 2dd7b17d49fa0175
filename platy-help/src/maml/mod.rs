//! MAML (XML command help) importer.

mod parser;
mod reader;

pub use parser::parse_document;

use crate::constants;
use crate::error::PlatyError;
use crate::model::CommandHelp;
use anyhow::Context;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Result of converting several MAML files. A document that fails to parse
/// contributes nothing to `commands` and is listed in `failures`.
#[derive(Debug, Default)]
pub struct MamlBatch {
    pub commands: Vec<CommandHelp>,
    pub failures: Vec<(PathBuf, anyhow::Error)>,
}

pub struct MamlTransform {
    module_name: Option<String>,
    locale: String,
}

impl Default for MamlTransform {
    fn default() -> Self {
        MamlTransform {
            module_name: None,
            locale: constants::DEFAULT_LOCALE.to_string(),
        }
    }
}

/// `Contoso.Tools-help.xml` and `Contoso.Tools.dll-Help.xml` both name the
/// module `Contoso.Tools`.
pub fn module_name_from_path(path: &Path) -> Option<String> {
    let lossy = path.file_name()?.to_string_lossy();
    let file_name: &str = &lossy;
    let suffix_len = constants::MAML_FILE_SUFFIX.len();
    if file_name.len() <= suffix_len
        || !file_name.is_char_boundary(file_name.len() - suffix_len)
        || !file_name[file_name.len() - suffix_len..]
            .eq_ignore_ascii_case(constants::MAML_FILE_SUFFIX)
    {
        return None;
    }

    let module = &file_name[..file_name.len() - suffix_len];
    let module = module
        .strip_suffix(".dll")
        .or_else(|| module.strip_suffix(".psm1"))
        .unwrap_or(module);
    Some(module.to_string())
}

impl MamlTransform {
    pub fn new() -> Self {
        Default::default()
    }

    /// Module name to use instead of the one inferred from the file name
    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = Some(module_name.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Converts every file, keeping going past documents that fail to parse.
    /// A file that does not exist fails the whole call before anything is read.
    pub fn transform<I>(&self, maml_files: I) -> anyhow::Result<MamlBatch>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let files: Vec<PathBuf> = maml_files
            .into_iter()
            .map(|f| f.as_ref().to_path_buf())
            .collect();

        if let Some(missing) = files.iter().find(|f| !f.is_file()) {
            return Err(PlatyError::ArgumentInvalid(format!(
                "file {} does not exist",
                missing.to_string_lossy()
            ))
            .into());
        }

        let mut batch = MamlBatch::default();
        for file in files {
            match self.read_file(&file) {
                Ok(commands) => batch.commands.extend(commands),
                Err(e) => {
                    log::warn!("{}: {:?}", file.to_string_lossy(), e);
                    batch.failures.push((file, e));
                }
            }
        }

        Ok(batch)
    }

    pub fn read_file(&self, path: &Path) -> anyhow::Result<Vec<CommandHelp>> {
        let file = File::open(path)
            .with_context(|| format!("could not open: {}", path.to_string_lossy()))?;
        let module_name = self
            .module_name
            .clone()
            .or_else(|| module_name_from_path(path))
            .unwrap_or_default();

        self.read_maml(BufReader::new(file), &module_name)
            .with_context(|| format!("failed to read MAML from: {}", path.to_string_lossy()))
    }

    pub fn read_maml<R: Read>(
        &self,
        source: R,
        module_name: &str,
    ) -> anyhow::Result<Vec<CommandHelp>> {
        let mut commands = parse_document(source)?;
        for command in &mut commands {
            command.module_name = module_name.to_string();
            command.locale = self.locale.clone();
        }
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_names_from_file_names() {
        let name = |p: &str| module_name_from_path(Path::new(p));
        assert_eq!(name("out/Contoso.Tools-help.xml").as_deref(), Some("Contoso.Tools"));
        assert_eq!(name("Contoso.Tools.dll-Help.xml").as_deref(), Some("Contoso.Tools"));
        assert_eq!(name("help.xml"), None);
        assert_eq!(name("-help.xml"), None);
    }
}
