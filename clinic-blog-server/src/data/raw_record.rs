//! Decoding of loosely-typed CMS documents into domain records.
//!
//! Each document is decoded on its own so one malformed post only drops that
//! post from the output.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use validator::{Validate, ValidationErrors};

use crate::domain::content::{
    AuthorRef, BlogSettings, Category, CategoryRef, ContentRecord, ImageRef, is_url_safe_slug,
};
use crate::domain::error::AssemblyError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[validate(length(min = 1, max = 96))]
    slug: Option<String>,
    #[validate(length(min = 1, max = 255))]
    title: Option<String>,
    published_at: Option<String>,
    updated_at: Option<String>,
    categories: Option<Vec<Option<RawCategoryRef>>>,
    author: Option<RawAuthorRef>,
    excerpt: Option<String>,
    body: Option<Value>,
    tags: Option<Vec<String>>,
    main_image: Option<RawImage>,
    popularity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCategoryRef {
    #[serde(rename = "_id")]
    id: Option<String>,
    slug: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAuthorRef {
    #[serde(rename = "_id")]
    id: Option<String>,
    name: Option<String>,
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    url: Option<String>,
    alt: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct RawCategory {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[validate(length(min = 1, max = 96))]
    slug: Option<String>,
    #[validate(length(min = 1))]
    title: Option<String>,
    description: Option<String>,
    order: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    title: Option<String>,
    description: Option<String>,
}

pub(crate) fn decode_record(value: Value) -> Result<ContentRecord, AssemblyError> {
    let raw: RawRecord = serde_json::from_value(value)
        .map_err(|err| AssemblyError::invalid("record", err.to_string()))?;
    raw.validate().map_err(first_validation_error)?;

    let slug = required(raw.slug, "slug")?;
    if !is_url_safe_slug(&slug) {
        return Err(AssemblyError::invalid("slug", format!("'{slug}' is not url-safe")));
    }
    let title = required(raw.title, "title")?;
    let published_at = parse_timestamp("publishedAt", &required(raw.published_at, "publishedAt")?)?;
    let updated_at = raw
        .updated_at
        .as_deref()
        .map(|value| parse_timestamp("updatedAt", value))
        .transpose()?;

    let categories = raw
        .categories
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|category| {
            let slug = category.slug.filter(|slug| !slug.is_empty())?;
            Some(CategoryRef {
                id: category.id.unwrap_or_else(|| slug.clone()),
                title: category.title.unwrap_or_else(|| slug.clone()),
                slug,
            })
        })
        .collect();

    let author = raw.author.and_then(|author| {
        let name = author.name.filter(|name| !name.trim().is_empty())?;
        Some(AuthorRef {
            id: author.id.unwrap_or_default(),
            name,
            slug: author.slug,
        })
    });

    let main_image = raw.main_image.and_then(|image| {
        let url = image.url.filter(|url| !url.is_empty())?;
        Some(ImageRef { url, alt: image.alt })
    });

    Ok(ContentRecord {
        id: raw.id.unwrap_or_else(|| slug.clone()),
        slug,
        title,
        published_at,
        updated_at,
        categories,
        author,
        excerpt: raw.excerpt.unwrap_or_default(),
        body: raw.body.filter(|body| !body.is_null()),
        tags: raw.tags.unwrap_or_default(),
        main_image,
        popularity: raw.popularity.map(|score| score.round() as i64),
    })
}

/// Decodes every document, logging and dropping the ones that fail.
pub(crate) fn decode_records(values: Vec<Value>) -> Vec<ContentRecord> {
    values
        .into_iter()
        .filter_map(|value| {
            let id = document_id(&value);
            match decode_record(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(document = %id, error = %err, "skipping malformed post");
                    None
                }
            }
        })
        .collect()
}

pub(crate) fn decode_categories(values: Vec<Value>) -> Vec<Category> {
    values
        .into_iter()
        .filter_map(|value| {
            let id = document_id(&value);
            match decode_category(value) {
                Ok(category) => Some(category),
                Err(err) => {
                    warn!(document = %id, error = %err, "skipping malformed category");
                    None
                }
            }
        })
        .collect()
}

pub(crate) fn decode_settings(value: Value) -> Option<BlogSettings> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value::<RawSettings>(value) {
        Ok(raw) => Some(BlogSettings {
            title: raw.title,
            description: raw.description,
        }),
        Err(err) => {
            warn!(error = %err, "ignoring malformed blog settings");
            None
        }
    }
}

fn decode_category(value: Value) -> Result<Category, AssemblyError> {
    let raw: RawCategory = serde_json::from_value(value)
        .map_err(|err| AssemblyError::invalid("category", err.to_string()))?;
    raw.validate().map_err(first_validation_error)?;

    let slug = required(raw.slug, "slug")?;
    if !is_url_safe_slug(&slug) {
        return Err(AssemblyError::invalid("slug", format!("'{slug}' is not url-safe")));
    }
    Ok(Category {
        id: raw.id.unwrap_or_else(|| slug.clone()),
        title: required(raw.title, "title")?,
        slug,
        description: raw.description.filter(|text| !text.trim().is_empty()),
        order: raw.order,
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AssemblyError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(AssemblyError::MissingField(field))
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, AssemblyError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AssemblyError::invalid(field, format!("'{value}' is not a timestamp")))
}

fn first_validation_error(errors: ValidationErrors) -> AssemblyError {
    let mut fields = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let code = errors
                .first()
                .map(|error| error.code.to_string())
                .unwrap_or_else(|| "invalid".to_string());
            (field.to_string(), code)
        })
        .collect::<Vec<_>>();
    fields.sort();
    match fields.into_iter().next() {
        Some((field, code)) => AssemblyError::invalid(field, code),
        None => AssemblyError::invalid("record", "validation failed"),
    }
}

fn document_id(value: &Value) -> String {
    value
        .get("_id")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_string()
}
