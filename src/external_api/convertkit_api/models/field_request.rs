/// Label payload: one label goes out as a string, several as an array
#[derive(serde::Serialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum LabelValue<'a> {
    One(&'a str),
    Many(&'a [String]),
}

impl<'a> LabelValue<'a> {
    pub fn from_labels(labels: &'a [String]) -> Self {
        match labels {
            [single] => LabelValue::One(single),
            many => LabelValue::Many(many),
        }
    }
}

/// JSON body shared by every custom field request. The secret always travels in the body
#[derive(serde::Serialize, Debug)]
pub struct FieldRequestBody<'a> {
    pub api_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelValue<'a>>,
}

impl<'a> FieldRequestBody<'a> {
    pub fn secret_only(api_secret: &'a str) -> Self {
        Self {
            api_secret,
            label: None,
        }
    }

    pub fn with_label(api_secret: &'a str, label: &'a str) -> Self {
        Self {
            api_secret,
            label: Some(LabelValue::One(label)),
        }
    }

    pub fn with_labels(api_secret: &'a str, labels: &'a [String]) -> Self {
        Self {
            api_secret,
            label: Some(LabelValue::from_labels(labels)),
        }
    }
}
