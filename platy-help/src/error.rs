use std::error::Error;
use std::fmt::Display;

#[derive(Debug)]
pub enum PlatyError {
    /// A required path, name or collection was null or empty
    ArgumentInvalid(String),
    /// The document does not follow the expected grammar (missing root, missing name, ...)
    StructuralParse(String),
    /// Narrative content was requested from a help record that does not exist
    MissingSourceData(&'static str),
    XmlError(xml::reader::Error),
}

impl Display for PlatyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            PlatyError::ArgumentInvalid(what) => {
                f.write_fmt(format_args!("Invalid argument: {}", what))
            }
            PlatyError::StructuralParse(what) => {
                f.write_fmt(format_args!("Invalid document structure: {}", what))
            }
            PlatyError::MissingSourceData(field) => f.write_fmt(format_args!(
                "Help record is missing while reading {}",
                field
            )),
            PlatyError::XmlError(xe) => xe.fmt(f),
        }
    }
}

impl Error for PlatyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self {
            PlatyError::XmlError(xe) => Some(xe),
            _ => None,
        }
    }
}

impl PlatyError {
    pub fn is_argument_invalid(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<PlatyError>(),
            Some(PlatyError::ArgumentInvalid(_))
        )
    }

    pub fn is_structural(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<PlatyError>(),
            Some(PlatyError::StructuralParse(_)) | Some(PlatyError::XmlError(_))
        )
    }

    pub fn is_missing_source_data(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<PlatyError>(),
            Some(PlatyError::MissingSourceData(_))
        )
    }
}
