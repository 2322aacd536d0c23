//! Email and in-app message templates for order notifications.

use rust_decimal::Decimal;

use super::NotificationPayload;
use crate::books::Book;
use crate::users::User;

/// Escapes text for use in HTML element content and attribute values.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Paragraphs are plain text; titles, names and contact lines come from users.
fn html_card(title: &str, paragraphs: &[String]) -> String {
    let title = escape_html(title);
    let body: String = paragraphs
        .iter()
        .map(|p| {
            format!(
                r#"<p style="margin: 0 0 16px; font-size: 15px; line-height: 1.6;">{}</p>"#,
                escape_html(p)
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>{title}</title></head>
<body style="margin: 0; padding: 24px; font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif; background-color: #f7f5f0; color: #1f1f1f;">
    <div style="max-width: 560px; margin: 0 auto; background: #ffffff; border: 1px solid #e4e0d6; border-radius: 12px; padding: 32px;">
        <h1 style="margin: 0 0 24px; font-size: 22px;">{title}</h1>
        {body}
        <p style="margin: 24px 0 0; font-size: 12px; color: #8a8578;">Bookloop - second-hand books, second chances.</p>
    </div>
</body>
</html>"#
    )
}

fn payload(subject: String, paragraphs: Vec<String>) -> NotificationPayload {
    NotificationPayload {
        html_body: Some(html_card(&subject, &paragraphs)),
        body: paragraphs.join("\n\n"),
        subject,
    }
}

pub fn order_confirmed_for_buyer(
    order_id: i64,
    book: &Book,
    amount: Decimal,
    seller: &User,
) -> NotificationPayload {
    payload(
        format!("Order #{order_id} confirmed"),
        vec![
            format!(
                "Your order for \"{}\" ({}) has been confirmed.",
                book.title,
                amount.round_dp(2)
            ),
            format!("Seller contact: {}", seller.contact_line()),
            "Please arrange the hand-over with the seller and confirm delivery once you have the book.".to_string(),
        ],
    )
}

pub fn order_confirmed_for_seller(order_id: i64, book: &Book, buyer: &User) -> NotificationPayload {
    payload(
        format!("Order #{order_id} confirmed - \"{}\" is sold", book.title),
        vec![
            format!("The order for your listing \"{}\" has been confirmed.", book.title),
            format!("Buyer contact: {}", buyer.contact_line()),
        ],
    )
}

pub fn order_delivered_for_buyer(order_id: i64, book: &Book) -> NotificationPayload {
    payload(
        format!("Order #{order_id} delivered"),
        vec![
            format!("You confirmed the delivery of \"{}\".", book.title),
            "Thank you for buying second-hand!".to_string(),
        ],
    )
}

pub fn order_delivered_for_seller(order_id: i64, book: &Book) -> NotificationPayload {
    payload(
        format!("Order #{order_id} completed"),
        vec![
            format!("The buyer confirmed receiving \"{}\".", book.title),
            "The listing has been removed from the marketplace.".to_string(),
        ],
    )
}

pub fn confirmed_message_for_buyer(order_id: i64, book: &Book, seller: &User) -> String {
    format!(
        "Your order #{order_id} for \"{}\" was confirmed. Contact the seller: {}",
        book.title,
        seller.contact_line()
    )
}

pub fn confirmed_message_for_seller(order_id: i64, book: &Book, buyer: &User) -> String {
    format!(
        "Order #{order_id} for \"{}\" was confirmed. Contact the buyer: {}",
        book.title,
        buyer.contact_line()
    )
}

pub fn delivered_message_for_buyer(order_id: i64, book: &Book) -> String {
    format!(
        "Order #{order_id} is complete. Enjoy \"{}\"!",
        book.title
    )
}

pub fn delivered_message_for_seller(order_id: i64, book: &Book) -> String {
    format!(
        "Order #{order_id} is complete: the buyer received \"{}\".",
        book.title
    )
}

pub fn follow_up_message(order_id: i64, confirm_link: &str) -> String {
    format!(
        "Have you received the book from order #{order_id}? Once it is in your hands, confirm the delivery here: {confirm_link}"
    )
}

/// Deep link that lets the buyer confirm delivery of an order.
pub fn confirm_delivery_link(base_url: &str, order_id: i64) -> String {
    format!(
        "{}/orders/{}/confirm-delivery",
        base_url.trim_end_matches('/'),
        order_id
    )
}
