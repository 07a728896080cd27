//! # Display Groupings (schema-resolver v1)
//!
//! The first schema-resolver API describes credentials for display only:
//! credential types bucketed under headings, each with a flat list of
//! labelled attributes. Four buckets have fixed names; the service may
//! add more, and those must survive a decode/encode round trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One displayable value of a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationSchemaAttributes {
    /// Key of the value inside the credential's data.
    pub key: String,
    pub label: String,
    pub comment: String,
    /// Free-form in v1; v2 schemas use the closed `DisplayFormat` set.
    pub display_format: String,
}

/// Display description of one credential type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationSchema {
    /// Credential type name.
    #[serde(rename = "type")]
    pub credential_type: String,
    pub attributes: Vec<PresentationSchemaAttributes>,
}

impl PresentationSchema {
    pub fn attribute(&self, key: &str) -> Option<&PresentationSchemaAttributes> {
        self.attributes.iter().find(|a| a.key == key)
    }
}

/// A headed bucket of credential types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSchemaData {
    pub heading: String,
    pub credentials: Vec<PresentationSchema>,
}

/// Buckets keyed by grouping name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGroupings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<CredentialSchemaData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<CredentialSchemaData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miscellaneous: Option<CredentialSchemaData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<CredentialSchemaData>,
    /// Buckets beyond the four named ones.
    #[serde(flatten)]
    pub extra: BTreeMap<String, CredentialSchemaData>,
}

impl SchemaGroupings {
    pub const NAME: &'static str = "name";
    pub const CONTACT_INFO: &'static str = "contactInfo";
    pub const MISCELLANEOUS: &'static str = "miscellaneous";
    pub const DOCUMENT: &'static str = "document";

    /// The bucket stored under a wire key.
    pub fn get(&self, key: &str) -> Option<&CredentialSchemaData> {
        match key {
            Self::NAME => self.name.as_ref(),
            Self::CONTACT_INFO => self.contact_info.as_ref(),
            Self::MISCELLANEOUS => self.miscellaneous.as_ref(),
            Self::DOCUMENT => self.document.as_ref(),
            other => self.extra.get(other),
        }
    }

    /// Every present bucket with its wire key: the named ones first, then
    /// the extras in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CredentialSchemaData)> {
        let named = [
            (Self::NAME, self.name.as_ref()),
            (Self::CONTACT_INFO, self.contact_info.as_ref()),
            (Self::MISCELLANEOUS, self.miscellaneous.as_ref()),
            (Self::DOCUMENT, self.document.as_ref()),
        ];
        named
            .into_iter()
            .filter_map(|(key, data)| data.map(|d| (key, d)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Find the display attribute `key` of `credential_type`, along with
    /// the grouping it sits in. The first grouping in [`iter`](Self::iter)
    /// order wins.
    pub fn find_attribute(
        &self,
        credential_type: &str,
        key: &str,
    ) -> Option<(&str, &PresentationSchemaAttributes)> {
        self.iter().find_map(|(grouping, data)| {
            data.credentials
                .iter()
                .filter(|c| c.credential_type == credential_type)
                .find_map(|c| c.attribute(key))
                .map(|attr| (grouping, attr))
        })
    }
}

/// The schema-resolver v1 response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaPresentationDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groupings: Option<SchemaGroupings>,
}
