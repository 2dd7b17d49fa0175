//! Known parameter types: PowerShell type accelerators and common .NET type names.

const KNOWN_TYPES: &[(&str, &str)] = &[
    ("string", "System.String"),
    ("char", "System.Char"),
    ("bool", "System.Boolean"),
    ("boolean", "System.Boolean"),
    ("byte", "System.Byte"),
    ("sbyte", "System.SByte"),
    ("int", "System.Int32"),
    ("int16", "System.Int16"),
    ("int32", "System.Int32"),
    ("int64", "System.Int64"),
    ("long", "System.Int64"),
    ("uint16", "System.UInt16"),
    ("uint32", "System.UInt32"),
    ("uint64", "System.UInt64"),
    ("float", "System.Single"),
    ("single", "System.Single"),
    ("double", "System.Double"),
    ("decimal", "System.Decimal"),
    ("object", "System.Object"),
    ("datetime", "System.DateTime"),
    ("timespan", "System.TimeSpan"),
    ("guid", "System.Guid"),
    ("uri", "System.Uri"),
    ("version", "System.Version"),
    ("type", "System.Type"),
    ("regex", "System.Text.RegularExpressions.Regex"),
    ("xml", "System.Xml.XmlDocument"),
    ("hashtable", "System.Collections.Hashtable"),
    ("idictionary", "System.Collections.IDictionary"),
    ("securestring", "System.Security.SecureString"),
    ("encoding", "System.Text.Encoding"),
    ("switch", "System.Management.Automation.SwitchParameter"),
    ("switchparameter", "System.Management.Automation.SwitchParameter"),
    ("scriptblock", "System.Management.Automation.ScriptBlock"),
    ("psobject", "System.Management.Automation.PSObject"),
    ("pscredential", "System.Management.Automation.PSCredential"),
    ("actionpreference", "System.Management.Automation.ActionPreference"),
    ("psmoduleinfo", "System.Management.Automation.PSModuleInfo"),
    ("runspace", "System.Management.Automation.Runspaces.Runspace"),
    ("pssession", "System.Management.Automation.Runspaces.PSSession"),
    ("ipaddress", "System.Net.IPAddress"),
    ("x509certificate", "System.Security.Cryptography.X509Certificates.X509Certificate"),
    ("cultureinfo", "System.Globalization.CultureInfo"),
];

/// Looks up `name` as an accelerator, a short name or a full name
/// (case-insensitive). Array suffixes are carried over to the result.
pub fn resolve(name: &str) -> Option<String> {
    let name = name.trim();
    if let Some(element) = name.strip_suffix("[]") {
        return resolve(element).map(|t| format!("{}[]", t));
    }
    if name.is_empty() {
        return None;
    }

    let lower = name.to_ascii_lowercase();
    KNOWN_TYPES
        .iter()
        .find(|(accelerator, full)| {
            *accelerator == lower
                || full.eq_ignore_ascii_case(name)
                || short_name(full).eq_ignore_ascii_case(name)
        })
        .map(|(_, full)| full.to_string())
}

/// Short display name of a full type name, eg. System.String[] -> String[]
pub fn short_name(full_name: &str) -> &str {
    let base_end = full_name.find(['[', '`']).unwrap_or(full_name.len());
    match full_name[..base_end].rfind('.') {
        Some(dot) => &full_name[dot + 1..],
        None => full_name,
    }
}

#[test]
fn resolves_accelerators_and_names() {
    assert_eq!(resolve("string").as_deref(), Some("System.String"));
    assert_eq!(resolve("System.String").as_deref(), Some("System.String"));
    assert_eq!(
        resolve("SwitchParameter").as_deref(),
        Some("System.Management.Automation.SwitchParameter")
    );
    assert_eq!(resolve(" Int32[] ").as_deref(), Some("System.Int32[]"));
    assert_eq!(resolve("Contoso.Widget"), None);
    assert_eq!(resolve(""), None);
}

#[test]
fn short_names() {
    assert_eq!(short_name("System.String"), "String");
    assert_eq!(short_name("System.String[]"), "String[]");
    assert_eq!(short_name("String"), "String");
    assert_eq!(
        short_name("System.Collections.Generic.List`1[System.String]"),
        "List`1[System.String]"
    );
}
