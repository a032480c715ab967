use std::collections::BTreeMap;

use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{CreateOrderRequest, OrderLineInput};
use super::repo::{self, NewOrder, NewOrderItem};
use super::repo_types::{Order, OrderItem};
use crate::{
    auth::{services::is_valid_email, AuthUser},
    cart::{self, pricing},
    error::{AppError, AppResult},
    products::{self, Product},
    state::AppState,
};

/// Collapse repeated products into one line each, keeping first-seen order.
pub(crate) fn merge_lines(lines: &[OrderLineInput]) -> AppResult<Vec<(Uuid, i32)>> {
    let mut order = Vec::new();
    let mut totals: BTreeMap<Uuid, i32> = BTreeMap::new();
    for line in lines {
        if line.quantity < 1 {
            return Err(AppError::BadRequest("quantity must be at least 1".into()));
        }
        let entry = totals.entry(line.product_id).or_insert_with(|| {
            order.push(line.product_id);
            0
        });
        *entry = (*entry)
            .checked_add(line.quantity)
            .ok_or_else(|| AppError::BadRequest("quantity too large".into()))?;
    }
    Ok(order.into_iter().map(|id| (id, totals[&id])).collect())
}

/// Match requested lines against current product rows.
pub(crate) fn price_lines<'a>(
    requested: &[(Uuid, i32)],
    products: &'a [Product],
) -> AppResult<Vec<(&'a Product, i32)>> {
    requested
        .iter()
        .map(|&(id, qty)| {
            products
                .iter()
                .find(|p| p.id == id && p.active)
                .map(|p| (p, qty))
                .ok_or_else(|| AppError::BadRequest(format!("Product {id} is not available")))
        })
        .collect()
}

fn validate_contact(req: &CreateOrderRequest) -> AppResult<()> {
    if req.customer.name.trim().is_empty() {
        return Err(AppError::BadRequest("customer name is required".into()));
    }
    if !is_valid_email(req.customer.email.trim()) {
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    let addr = &req.shipping_address;
    for (field, value) in [("address", &addr.line), ("city", &addr.city), ("country", &addr.country)] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{field} is required")));
        }
    }
    Ok(())
}

/// Place an order. Signed-in users check out their cart, which is emptied in
/// the same transaction; guests send the lines in the request.
pub async fn place_order(
    st: &AppState,
    user: Option<AuthUser>,
    req: &CreateOrderRequest,
) -> AppResult<(Order, Vec<OrderItem>)> {
    validate_contact(req)?;

    let guest_lines = match (user, &req.items) {
        (Some(_), Some(_)) => {
            return Err(AppError::BadRequest(
                "signed-in checkout uses the cart; omit items".into(),
            ))
        }
        (None, None) => return Err(AppError::BadRequest("items are required".into())),
        (None, Some(items)) => Some(merge_lines(items)?),
        (Some(_), None) => None,
    };

    let mut tx = st.db.begin().await?;

    let requested = match (user, guest_lines) {
        (_, Some(lines)) => lines,
        (Some(u), None) => cart::repo::lines_tx(&mut tx, u.id)
            .await?
            .into_iter()
            .map(|l| (l.product_id, l.quantity))
            .collect(),
        (None, None) => Vec::new(),
    };
    if requested.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let ids: Vec<Uuid> = requested.iter().map(|(id, _)| *id).collect();
    let rows = products::repo::get_many_tx(&mut tx, &ids).await?;
    let priced = price_lines(&requested, &rows)?;
    let totals = pricing::compute(priced.iter().map(|(p, qty)| (p.price, *qty)));

    let email = req.customer.email.trim().to_lowercase();
    let order = repo::insert_tx(
        &mut tx,
        &NewOrder {
            user_id: user.map(|u| u.id),
            customer_name: req.customer.name.trim(),
            customer_email: &email,
            customer_phone: req.customer.phone.as_deref(),
            address_line: req.shipping_address.line.trim(),
            city: req.shipping_address.city.trim(),
            country: req.shipping_address.country.trim(),
            postal_code: req.shipping_address.postal_code.as_deref(),
            totals,
        },
    )
    .await?;

    let mut items = Vec::with_capacity(priced.len());
    for (product, quantity) in &priced {
        if product.stock < *quantity {
            // Stock is informational only; admins adjust it by hand.
            warn!(product_id = %product.id, stock = product.stock, quantity, "order exceeds stock");
        }
        items.push(
            repo::insert_item_tx(
                &mut tx,
                order.id,
                &NewOrderItem {
                    product_id: product.id,
                    product_name: &product.name,
                    product_name_ar: &product.name_ar,
                    unit_price: product.price,
                    quantity: *quantity,
                },
            )
            .await?,
        );
    }

    if let Some(u) = user {
        cart::repo::clear_tx(&mut tx, u.id).await?;
    }
    tx.commit().await?;

    info!(
        order_id = %order.id,
        user_id = ?order.user_id,
        total = %order.total,
        lines = items.len(),
        "order placed"
    );
    Ok((order, items))
}

/// Admins see every order; users only their own.
pub(crate) fn can_view(order: &Order, user: &AuthUser) -> bool {
    user.is_admin() || order.user_id == Some(user.id)
}

/// Guests prove ownership with the email used at checkout.
pub(crate) fn guest_can_track(order: &Order, email: &str) -> bool {
    order.customer_email.eq_ignore_ascii_case(email.trim())
}
