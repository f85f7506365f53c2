use crate::{
    kmip_0::{
        kmip_data_structures::{AttributeValue, Name},
        kmip_types::{enum_child, mask_child, CryptographicAlgorithm, CryptographicUsageMask},
    },
    ttlv::TTLV,
    KmipError,
};

/// A client-defined attribute carried inside `Attributes`, the 2.0
/// replacement for 1.x custom attributes (`x-` names). The vendor
/// identification rides along as its own field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAttribute {
    pub vendor_identification: String,
    pub attribute_name: String,
    pub attribute_value: AttributeValue,
}

impl CustomAttribute {
    #[must_use]
    pub fn to_ttlv(&self) -> TTLV {
        TTLV::structure(
            "Attribute",
            vec![
                TTLV::text_string("VendorIdentification", &self.vendor_identification),
                TTLV::text_string("AttributeName", &self.attribute_name),
                self.attribute_value.to_ttlv("AttributeValue"),
            ],
        )
    }

    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        Ok(Self {
            vendor_identification: ttlv
                .child("VendorIdentification")
                .map(TTLV::as_text)
                .transpose()?
                .unwrap_or_default()
                .to_owned(),
            attribute_name: ttlv
                .child_required("AttributeName")?
                .as_text()?
                .to_owned(),
            attribute_value: AttributeValue::from_ttlv(ttlv.child_required("AttributeValue")?)?,
        })
    }
}

/// KMIP 2.0 §2.1 flat `Attributes` structure: children are the attribute
/// values themselves, tagged by their semantic tag, instead of 1.x
/// name/value `Attribute` wrappers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pub cryptographic_algorithm: Option<CryptographicAlgorithm>,
    pub cryptographic_length: Option<i32>,
    pub cryptographic_usage_mask: Option<CryptographicUsageMask>,
    pub object_group: Option<String>,
    pub name: Vec<Name>,
    pub attribute: Vec<CustomAttribute>,
}

impl Attributes {
    pub fn to_ttlv(&self) -> Result<TTLV, KmipError> {
        let mut items = Vec::new();
        if let Some(algorithm) = self.cryptographic_algorithm {
            items.push(TTLV::enumeration("CryptographicAlgorithm", algorithm));
        }
        if let Some(length) = self.cryptographic_length {
            items.push(TTLV::integer("CryptographicLength", length));
        }
        if let Some(mask) = self.cryptographic_usage_mask {
            items.push(TTLV::integer("CryptographicUsageMask", mask.as_i32()?));
        }
        if let Some(object_group) = &self.object_group {
            items.push(TTLV::text_string("ObjectGroup", object_group));
        }
        for name in &self.name {
            items.push(name.to_ttlv("Name"));
        }
        for attribute in &self.attribute {
            items.push(attribute.to_ttlv());
        }
        Ok(TTLV::structure("Attributes", items))
    }

    pub fn from_ttlv(ttlv: &TTLV) -> Result<Self, KmipError> {
        let cryptographic_algorithm = match enum_child(ttlv, "CryptographicAlgorithm")? {
            Some(variant) => Some(CryptographicAlgorithm::from_variant(variant)?),
            None => None,
        };
        let cryptographic_length = match ttlv.child("CryptographicLength") {
            Some(item) => Some(item.as_integer()?),
            None => None,
        };
        let cryptographic_usage_mask =
            mask_child(ttlv, "CryptographicUsageMask")?.map(CryptographicUsageMask);
        let object_group = match ttlv.child("ObjectGroup") {
            Some(item) => Some(item.as_text()?.to_owned()),
            None => None,
        };
        let mut name = Vec::new();
        for item in ttlv.children_with_tag("Name") {
            name.push(Name::from_ttlv(item)?);
        }
        let mut attribute = Vec::new();
        for item in ttlv.children_with_tag("Attribute") {
            attribute.push(CustomAttribute::from_ttlv(item)?);
        }
        Ok(Self {
            cryptographic_algorithm,
            cryptographic_length,
            cryptographic_usage_mask,
            object_group,
            name,
            attribute,
        })
    }
}
