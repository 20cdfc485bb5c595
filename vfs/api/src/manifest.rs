//! Reading of JAR manifests (`META-INF/MANIFEST.MF`).

use std::collections::BTreeMap;
use std::io::{self, Read};

/// The location of the manifest inside an archive.
pub const MANIFEST_NAME: &str = "META-INF/MANIFEST.MF";

/// An ordered set of manifest attributes with case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, name: String, value: String) {
        match self
            .entries
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }
}

/// A parsed manifest: the main attributes plus one attribute set per named
/// entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    main: Attributes,
    entries: BTreeMap<String, Attributes>,
}

impl Manifest {
    pub fn read(mut reader: impl Read) -> io::Result<Self> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        let text = String::from_utf8(raw)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> io::Result<Self> {
        let mut manifest = Manifest::default();
        let mut section = Attributes::default();
        let mut in_main = true;
        let mut pending: Option<(String, String)> = None;

        let lines = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
        for line in lines {
            if let Some(rest) = line.strip_prefix(' ') {
                match pending.as_mut() {
                    Some((_, value)) => value.push_str(rest),
                    None => return Err(malformed("continuation line without attribute")),
                }
                continue;
            }

            if let Some((name, value)) = pending.take() {
                section.insert(name, value);
            }

            if line.is_empty() {
                manifest.finish_section(std::mem::take(&mut section), &mut in_main)?;
                continue;
            }

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| malformed("attribute line without ':'"))?;
            let value = value.strip_prefix(' ').unwrap_or(value);
            if name.is_empty() {
                return Err(malformed("empty attribute name"));
            }
            pending = Some((name.to_string(), value.to_string()));
        }

        if let Some((name, value)) = pending.take() {
            section.insert(name, value);
        }
        manifest.finish_section(section, &mut in_main)?;
        Ok(manifest)
    }

    fn finish_section(&mut self, section: Attributes, in_main: &mut bool) -> io::Result<()> {
        if *in_main {
            self.main = section;
            *in_main = false;
            return Ok(());
        }
        if section.is_empty() {
            return Ok(());
        }
        let name = section
            .get("Name")
            .ok_or_else(|| malformed("manifest section without a Name attribute"))?
            .to_string();
        self.entries.insert(name, section);
        Ok(())
    }

    pub fn main_attributes(&self) -> &Attributes {
        &self.main
    }

    /// Attributes of a named entry section.
    pub fn attributes(&self, name: &str) -> Option<&Attributes> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Attributes)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn malformed(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("invalid manifest: {what}"),
    )
}
