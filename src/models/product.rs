use std::collections::HashSet;

use rust_decimal::{Decimal, RoundingStrategy, dec};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    models::{Category, CategoryRef},
    utils::deserialize::null_as_default,
};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub img_url: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(
        custom(function = "not_blank"),
        length(min = 3, max = 80, message = "Nome precisar ter de 3 a 80 caracteres")
    )]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(
        custom(function = "not_blank"),
        length(min = 10, message = "Descrição precisa ter no mínimo 10 caracteres")
    )]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(length(max = 512, message = "URL da imagem deve ter no máximo 512 caracteres"))]
    pub img_url: String,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "positive_price"))]
    pub price: Decimal,

    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(length(min = 1, message = "Deve ter pelo menos uma categoria"))]
    pub categories: Vec<CategoryRef>,
}

impl ProductRequest {
    /// Distinct category ids in request order.
    pub fn category_ids(&self) -> Vec<i64> {
        let mut seen = HashSet::new();
        self.categories
            .iter()
            .map(|c| c.id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("Campo requerido".into());
        return Err(err);
    }
    Ok(())
}

/// Largest value a `NUMERIC(12, 2)` price column holds.
pub const MAX_PRICE: Decimal = dec!(9999999999.99);

/// Rounds to the two decimal places of the price column, half away from zero like PostgreSQL.
pub fn stored_price(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn positive_price(price: &Decimal) -> Result<(), ValidationError> {
    let stored = stored_price(*price);

    if stored <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some("O preço deve ser positivo".into());
        return Err(err);
    }

    if stored > MAX_PRICE {
        let mut err = ValidationError::new("max");
        err.message = Some("O preço excede o valor máximo permitido".into());
        return Err(err);
    }

    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub img_url: String,
    pub categories: Vec<Category>,
}

impl ProductDto {
    pub fn new(product: Product, categories: Vec<Category>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            img_url: product.img_url,
            categories,
        }
    }
}

/// Listing projection.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductMinDto {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub img_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for ProductSort {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            direction: SortDirection::Asc,
        }
    }
}

impl ProductSort {
    /// Parses `field[,asc|desc]`. Unknown fields fall back to the default ordering.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let mut parts = raw.split(',').map(str::trim);

        let field = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("id") => SortField::Id,
            Some("name") => SortField::Name,
            Some("price") => SortField::Price,
            _ => return Self::default(),
        };

        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };

        Self { field, direction }
    }

    /// ORDER BY clause; id is the tie-breaker so pages are stable.
    pub fn order_by(&self) -> &'static str {
        match (self.field, self.direction) {
            (SortField::Id, SortDirection::Asc) => "id ASC",
            (SortField::Id, SortDirection::Desc) => "id DESC",
            (SortField::Name, SortDirection::Asc) => "name ASC, id ASC",
            (SortField::Name, SortDirection::Desc) => "name DESC, id ASC",
            (SortField::Price, SortDirection::Asc) => "price ASC, id ASC",
            (SortField::Price, SortDirection::Desc) => "price DESC, id ASC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, FieldMessage};
    use serde_json::json;

    fn valid_payload() -> serde_json::Value {
        json!({
            "name": "Meu produto",
            "description": "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
            "imgUrl": "https://raw.githubusercontent.com/devsuperior/dscatalog-resources/master/backend/img/1-big.jpg",
            "price": 50.0,
            "categories": [{ "id": 2 }, { "id": 3 }]
        })
    }

    fn messages_for(payload: serde_json::Value) -> Vec<FieldMessage> {
        let request: ProductRequest = serde_json::from_value(payload).unwrap();
        match request.validate() {
            Ok(()) => vec![],
            Err(errors) => match AppError::from(errors) {
                AppError::Validation(messages) => messages,
                other => panic!("unexpected error: {other:?}"),
            },
        }
    }

    #[test]
    fn valid_payload_passes() {
        let request: ProductRequest = serde_json::from_value(valid_payload()).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.price, dec!(50));
        assert_eq!(request.category_ids(), vec![2, 3]);
    }

    #[test]
    fn short_name_is_rejected() {
        let mut payload = valid_payload();
        payload["name"] = json!("ab");

        assert_eq!(
            messages_for(payload),
            vec![FieldMessage::new("name", "Nome precisar ter de 3 a 80 caracteres")]
        );
    }

    #[test]
    fn long_name_is_rejected() {
        let mut payload = valid_payload();
        payload["name"] = json!("x".repeat(81));

        assert_eq!(messages_for(payload)[0].field_name, "name");
    }

    #[test]
    fn short_description_is_rejected() {
        let mut payload = valid_payload();
        payload["description"] = json!("ab");

        assert_eq!(
            messages_for(payload),
            vec![FieldMessage::new(
                "description",
                "Descrição precisa ter no mínimo 10 caracteres"
            )]
        );
    }

    #[test]
    fn zero_and_negative_prices_are_rejected() {
        for price in [json!(0.0), json!(-50.0), json!(null)] {
            let mut payload = valid_payload();
            payload["price"] = price;

            assert_eq!(
                messages_for(payload),
                vec![FieldMessage::new("price", "O preço deve ser positivo")]
            );
        }
    }

    #[test]
    fn null_or_empty_categories_are_rejected() {
        for categories in [json!(null), json!([])] {
            let mut payload = valid_payload();
            payload["categories"] = categories;

            assert_eq!(
                messages_for(payload),
                vec![FieldMessage::new("categories", "Deve ter pelo menos uma categoria")]
            );
        }
    }

    #[test]
    fn blank_name_reports_required() {
        let mut payload = valid_payload();
        payload["name"] = json!("   ");

        let messages = messages_for(payload);
        assert!(messages.contains(&FieldMessage::new("name", "Campo requerido")));
    }

    #[test]
    fn duplicate_category_ids_are_collapsed() {
        let mut payload = valid_payload();
        payload["categories"] = json!([{ "id": 3 }, { "id": 2 }, { "id": 3 }]);

        let request: ProductRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(request.category_ids(), vec![3, 2]);
    }

    #[test]
    fn accepts_boundary_lengths_and_smallest_price() {
        let mut payload = valid_payload();
        payload["name"] = json!("abc");
        payload["description"] = json!("0123456789");
        payload["price"] = json!(0.01);
        assert_eq!(messages_for(payload), vec![]);

        let mut payload = valid_payload();
        payload["name"] = json!("x".repeat(80));
        payload["imgUrl"] = json!("u".repeat(512));
        payload["price"] = json!(9999999999.99);
        assert_eq!(messages_for(payload), vec![]);
    }

    #[test]
    fn multibyte_names_are_measured_in_characters() {
        let mut payload = valid_payload();
        payload["name"] = json!("ção");

        assert_eq!(messages_for(payload), vec![]);
    }

    #[test]
    fn price_that_rounds_to_zero_is_rejected() {
        for price in [json!(0.001), json!(0.004)] {
            let mut payload = valid_payload();
            payload["price"] = price;

            assert_eq!(
                messages_for(payload),
                vec![FieldMessage::new("price", "O preço deve ser positivo")]
            );
        }
    }

    #[test]
    fn price_above_column_range_is_rejected() {
        let mut payload = valid_payload();
        payload["price"] = json!(1e11);

        assert_eq!(
            messages_for(payload),
            vec![FieldMessage::new("price", "O preço excede o valor máximo permitido")]
        );
    }

    #[test]
    fn stored_price_rounds_half_away_from_zero() {
        assert_eq!(stored_price(dec!(0.005)), dec!(0.01));
        assert_eq!(stored_price(dec!(10.125)), dec!(10.13));
        assert_eq!(stored_price(dec!(90.5)), dec!(90.50));
    }

    #[test]
    fn long_img_url_is_rejected() {
        let mut payload = valid_payload();
        payload["imgUrl"] = json!(format!("https://example.com/{}", "a".repeat(600)));

        let messages = messages_for(payload);
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].message,
            "URL da imagem deve ter no máximo 512 caracteres"
        );
    }

    #[test]
    fn sort_parsing() {
        assert_eq!(ProductSort::parse(None), ProductSort::default());
        assert_eq!(ProductSort::parse(Some("price,desc")).order_by(), "price DESC, id ASC");
        assert_eq!(ProductSort::parse(Some("ID")).order_by(), "id ASC");
        assert_eq!(ProductSort::parse(Some("name; DROP TABLE")), ProductSort::default());
    }

    #[test]
    fn product_dto_uses_camel_case_and_numeric_price() {
        let product = Product {
            id: 2,
            name: "Smart TV".to_string(),
            description: "Lorem ipsum dolor sit amet".to_string(),
            price: dec!(2190.0),
            img_url: "https://example.com/2-big.jpg".to_string(),
        };
        let categories = vec![
            Category { id: 2, name: "Eletrônicos".to_string() },
            Category { id: 3, name: "Computadores".to_string() },
        ];

        let json = serde_json::to_value(ProductDto::new(product, categories)).unwrap();

        assert_eq!(json["imgUrl"], "https://example.com/2-big.jpg");
        assert_eq!(json["price"].as_f64(), Some(2190.0));
        assert_eq!(json["categories"][1]["name"], "Computadores");
    }
}
