use crate::{
    kmip_0::kmip_data_structures::{Attribute, AttributeValue},
    ttlv::TTLV,
    KmipError,
};

/// KMIP 1.4 §2.1.8 Template-Attribute: the structure that carries the
/// attributes of a Create or Register request in the 1.x dialect (2.0
/// flattened it into `Attributes`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateAttribute {
    pub attribute: Vec<Attribute>,
}

impl TemplateAttribute {
    /// Append an attribute under its semantic name.
    pub fn push(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attribute.push(Attribute::new(name, value));
    }

    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            "TemplateAttribute",
            self.attribute
                .iter()
                .map(|attribute| attribute.to_ttlv("Attribute"))
                .collect(),
        )
    }

    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let mut attribute = Vec::new();
        for item in ttlv.children_with_tag("Attribute") {
            attribute.push(Attribute::from_ttlv(item)?);
        }
        Ok(Self { attribute })
    }
}
