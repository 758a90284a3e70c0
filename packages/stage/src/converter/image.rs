use super::Converter;
use crate::asset::AssetResolver;
use crate::data_store::DataObject;
use crate::error::ConversionError;
use regex::Regex;
use serde_json::{json, Value};
use std::borrow::Cow;
use std::rc::Rc;
use std::sync::OnceLock;

static MEDIA_DIRECTIVE: OnceLock<Regex> = OnceLock::new();

fn media_directive() -> &'static Regex {
    MEDIA_DIRECTIVE.get_or_init(|| {
        Regex::new(r#"\{\{.*\s*url="?(.*\.([a-zA-Z|]*))"?\s*\}\}"#).expect("media directive regex")
    })
}

/// Image reference stored as a `{{media url=...}}` directive
///
/// Reading yields a one-element list describing the image, or an empty
/// string when the source is not a media directive. Writing emits the
/// directive for the first listed image and omits empty values.
#[derive(Debug, Clone)]
pub struct ImageConverter {
    assets: Rc<dyn AssetResolver>,
}

impl ImageConverter {
    pub fn new(assets: Rc<dyn AssetResolver>) -> Self {
        Self { assets }
    }
}

impl Converter for ImageConverter {
    fn from_dom(&self, raw: &str) -> Result<Value, ConversionError> {
        let decoded = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));

        let Some(captures) = media_directive().captures(&decoded) else {
            return Ok(Value::String(String::new()));
        };
        let path = &captures[1];
        let extension = &captures[2];
        let name = path.rsplit('/').next().unwrap_or(path);

        Ok(json!([{
            "name": name,
            "size": 0,
            "type": format!("image/{}", extension),
            "url": self.assets.resolve(path),
        }]))
    }

    fn to_dom(&self, name: &str, data: &DataObject) -> Option<String> {
        let url = match data.get(name)? {
            Value::Array(images) => images.first()?.get("url")?.as_str()?.to_string(),
            Value::String(url) => url.clone(),
            _ => return None,
        };
        if url.is_empty() {
            return None;
        }
        match self.assets.relativize(&url) {
            Some(path) => Some(format!("{{{{media url={}}}}}", path)),
            None => Some(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MediaUrlResolver;

    fn converter() -> ImageConverter {
        ImageConverter::new(Rc::new(MediaUrlResolver::new("/media/")))
    }

    #[test]
    fn test_reads_quoted_directive() {
        let value = converter()
            .from_dom(r#"{{media url="wysiwyg/banner.jpg"}}"#)
            .unwrap();
        assert_eq!(
            value,
            json!([{ "name": "banner.jpg", "size": 0, "type": "image/jpg", "url": "/media/wysiwyg/banner.jpg" }])
        );
    }

    #[test]
    fn test_reads_percent_encoded_directive() {
        let value = converter()
            .from_dom("%7B%7Bmedia%20url%3Dwysiwyg%2Fa.png%7D%7D")
            .unwrap();
        assert_eq!(value[0]["url"], json!("/media/wysiwyg/a.png"));
    }

    #[test]
    fn test_plain_url_reads_as_empty() {
        assert_eq!(converter().from_dom("https://example.com/a.png"), Ok(json!("")));
        assert_eq!(converter().from_dom(""), Ok(json!("")));
    }

    #[test]
    fn test_write_then_read() {
        let image = converter().from_dom("{{media url=wysiwyg/a.png}}").unwrap();
        let mut data = DataObject::new();
        data.insert("image".into(), image.clone());

        let written = converter().to_dom("image", &data).unwrap();
        assert_eq!(written, "{{media url=wysiwyg/a.png}}");
        assert_eq!(converter().from_dom(&written), Ok(image));
    }

    #[test]
    fn test_empty_image_is_omitted() {
        let mut data = DataObject::new();
        data.insert("image".into(), json!(""));
        assert_eq!(converter().to_dom("image", &data), None);
        data.insert("image".into(), json!([]));
        assert_eq!(converter().to_dom("image", &data), None);
    }
}
