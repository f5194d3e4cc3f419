use super::*;

use serde_json::json;

use crate::types::CommentsData;

fn main_record(value: serde_json::Value) -> MainRecord {
    serde_json::from_value(value).unwrap()
}

fn detail_record(value: serde_json::Value) -> DetailRecord {
    serde_json::from_value(value).unwrap()
}

fn thread(value: serde_json::Value) -> CommentThread {
    let data: CommentsData = serde_json::from_value(value).unwrap();
    CommentThread {
        total: data.total_comments,
        declared_pages: data.pages.page_count().unwrap().unwrap_or(1),
        comments: data.comments,
    }
}

fn id() -> ProductId {
    ProductId::new("123")
}

// -----------------------------------------------------------------------
// prices
// -----------------------------------------------------------------------

#[test]
fn price_with_spaces_and_currency_parses() {
    let price = parse_price(Some(&Scalar::Text("1 299 ₴".to_owned())));
    assert_eq!(price, Some(Decimal::new(1299, 0)));
}

#[test]
fn price_zero_or_garbage_is_absent() {
    assert_eq!(parse_price(Some(&Scalar::Integer(0))), None);
    assert_eq!(parse_price(Some(&Scalar::Text("ціну уточнюйте".to_owned()))), None);
    assert_eq!(parse_price(Some(&Scalar::Text("1.2.3".to_owned()))), None);
    assert_eq!(parse_price(None), None);
}

#[test]
fn single_price_has_no_discount() {
    let record = normalize_product(
        &id(),
        None,
        &main_record(json!({"price": "1 299 ₴"})),
        &CommentThread::default(),
    );
    assert_eq!(record.price, Some(Decimal::new(1299, 0)));
    assert_eq!(record.price_display(), "1299 ₴");
    assert_eq!(record.old_price, None);
    assert_eq!(record.discount_label(), "Ні");
}

#[test]
fn lower_price_than_old_price_is_discount() {
    let record = normalize_product(
        &id(),
        None,
        &main_record(json!({"price": 1200, "old_price": 1500})),
        &CommentThread::default(),
    );
    assert!(record.discount);
    assert_eq!(record.discount_label(), "Так");
    assert_eq!(record.old_price_display(), "1500 ₴");
}

#[test]
fn equal_prices_are_not_discount() {
    let record = normalize_product(
        &id(),
        None,
        &main_record(json!({"price": 1200, "old_price": 1200})),
        &CommentThread::default(),
    );
    assert!(!record.discount);
}

#[test]
fn bad_old_price_does_not_discard_price() {
    let record = normalize_product(
        &id(),
        None,
        &main_record(json!({"price": 999, "old_price": "n/a"})),
        &CommentThread::default(),
    );
    assert_eq!(record.price, Some(Decimal::new(999, 0)));
    assert_eq!(record.old_price, None);
}

// -----------------------------------------------------------------------
// field fallback
// -----------------------------------------------------------------------

#[test]
fn main_fields_win_over_detail_fields() {
    let detail = detail_record(json!({
        "id": 123, "title": "Detail title", "brand": "DetailBrand", "price": 10,
        "href": "https://rozetka.com.ua/ua/lenovo/p123/"
    }));
    let main = main_record(json!({"title": "Main title", "brand_name": "Lenovo", "price": 20}));
    let record = normalize_product(&id(), Some(&detail), &main, &CommentThread::default());
    assert_eq!(record.title, "Main title");
    assert_eq!(record.brand, "Lenovo");
    assert_eq!(record.price, Some(Decimal::new(20, 0)));
    assert_eq!(record.href, "https://rozetka.com.ua/ua/lenovo/p123/");
}

#[test]
fn detail_fields_fill_gaps_in_main() {
    let detail = detail_record(json!({"id": 123, "title": "Detail title", "brand": "Asus", "price": "1 500"}));
    let main = main_record(json!({"title": null}));
    let record = normalize_product(&id(), Some(&detail), &main, &CommentThread::default());
    assert_eq!(record.title, "Detail title");
    assert_eq!(record.brand, "Asus");
    assert_eq!(record.price, Some(Decimal::new(1500, 0)));
}

#[test]
fn empty_sources_fall_back_to_placeholders() {
    let record = normalize_product(
        &id(),
        None,
        &MainRecord::default(),
        &CommentThread::default(),
    );
    assert_eq!(record.href, "https://rozetka.com.ua/ua/p123/");
    assert_eq!(record.title, "Н/Д");
    assert_eq!(record.brand, "Н/Д");
    assert_eq!(record.price_display(), "Н/Д");
    assert_eq!(record.sell_status, "Н/Д");
    assert_eq!(record.category_title, "Н/Д");
    assert_eq!(record.description, "Опис відсутній");
    assert_eq!(record.rating, RatingSummary::default());
    assert!(record.characteristics.is_empty());
    assert!(record.comments.is_empty());
    assert!(record.images.is_empty());
}

#[test]
fn description_markup_is_stripped() {
    let main = main_record(json!({
        "description": {"text": "<p>Легкий</p><p>та <b>тихий</b></p>"},
        "product": {"sell_status": "available"},
        "last_category": {"title": "Ноутбуки"}
    }));
    let record = normalize_product(&id(), None, &main, &CommentThread::default());
    assert_eq!(record.description, "Легкий та тихий");
    assert_eq!(record.sell_status, "available");
    assert_eq!(record.category_title, "Ноутбуки");
}

#[test]
fn markup_only_description_uses_placeholder() {
    assert_eq!(clean_description(Some("<br/>")), "Опис відсутній");
    assert_eq!(clean_description(None), "Опис відсутній");
}

// -----------------------------------------------------------------------
// characteristics and images
// -----------------------------------------------------------------------

#[test]
fn characteristics_flatten_in_source_order() {
    let main = main_record(json!({
        "characteristics": [
            {"options": [
                {"title": "Колір", "values": [{"title": "Чорний"}, {"title": "Сірий"}]},
                {"title": "Вага", "values": [{"title": "1.2 кг"}]}
            ]},
            {"options": [{"title": "Гарантія", "values": [{"title": "12 міс"}]}]}
        ]
    }));
    let pairs: Vec<(String, String)> = extract_characteristics(&main)
        .into_iter()
        .map(|c| (c.name, c.value))
        .collect();
    assert_eq!(
        pairs,
        [
            ("Колір".to_owned(), "Чорний".to_owned()),
            ("Колір".to_owned(), "Сірий".to_owned()),
            ("Вага".to_owned(), "1.2 кг".to_owned()),
            ("Гарантія".to_owned(), "12 міс".to_owned()),
        ]
    );
}

#[test]
fn images_deduplicated_gallery_first() {
    let main = main_record(json!({
        "product": {"images": [
            {"original": {"url": "https://img/1.jpg"}},
            {"original": {}},
            {"original": {"url": "https://img/2.jpg"}}
        ]},
        "varParams": {"options": [{"values": [
            {"bgImageUrl": "", "product": {"image": "https://img/2.jpg"}},
            {"bgImageUrl": "https://img/swatch.png", "product": {"image": "https://img/3.jpg"}},
            {"bgImageUrl": null}
        ]}]}
    }));
    assert_eq!(
        extract_images(&main),
        [
            "https://img/1.jpg",
            "https://img/2.jpg",
            "https://img/swatch.png",
            "https://img/3.jpg"
        ]
    );
}

// -----------------------------------------------------------------------
// comments and rating
// -----------------------------------------------------------------------

#[test]
fn comments_map_with_defaults() {
    let comments = thread(json!({
        "comments": [
            {"usertitle": "Олена", "mark": 5, "text": "Чудово", "created": {"day": 3, "month": 11, "year": 2024}},
            {"text": "Без оцінки", "created": {"day": 3, "month": 0, "year": 2024}}
        ],
        "total_comments": {"comment_count_comments": 2, "comment_avg_marks": 4.5,
                           "comment_count_marks_5": 1, "comment_count_marks_1": "0"},
        "pages": {"count": 1}
    }));
    let record = normalize_product(&id(), None, &MainRecord::default(), &comments);

    assert_eq!(
        record.comments[0],
        Comment {
            user: "Олена".to_owned(),
            mark: "5".to_owned(),
            text: "Чудово".to_owned(),
            date: "3.11.2024".to_owned(),
        }
    );
    assert_eq!(record.comments[1].user, "Анонім");
    assert_eq!(record.comments[1].mark, "Н/Д");
    assert_eq!(record.comments[1].date, "");

    assert_eq!(record.rating.comment_count, "2");
    assert_eq!(record.rating.average_mark, "4.5");
    assert_eq!(record.rating.marks, ["0", "0", "0", "0", "1"]);
}

#[test]
fn malformed_comment_renders_as_anonymous_placeholder() {
    let comments = thread(json!({
        "comments": [{"text": "перший"}, null, "junk"],
        "total_comments": {"comment_count_comments": 3, "comment_avg_marks": 4.0}
    }));
    let record = normalize_product(&id(), None, &MainRecord::default(), &comments);

    assert_eq!(record.comments.len(), 3);
    for comment in &record.comments[1..] {
        assert_eq!(comment.user, "Анонім");
        assert_eq!(comment.mark, "Н/Д");
        assert_eq!(comment.text, "");
        assert_eq!(comment.date, "");
    }
    assert_eq!(record.rating.average_mark, "4.0");
}

#[test]
fn declared_total_is_not_reconciled_with_comment_list() {
    let comments = thread(json!({
        "comments": [{"text": "one"}],
        "total_comments": {"comment_count_comments": 40}
    }));
    let record = normalize_product(&id(), None, &MainRecord::default(), &comments);
    assert_eq!(record.rating.comment_count, "40");
    assert_eq!(record.comments.len(), 1);
}

#[test]
fn comment_date_needs_all_parts() {
    let created: CommentCreated =
        serde_json::from_value(json!({"day": "1", "month": "2"})).unwrap();
    assert_eq!(format_comment_date(&created), "");
}
