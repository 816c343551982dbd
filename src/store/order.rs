use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

use crate::export::descriptor::MockupDescriptor;
use crate::foundation::error::{MockupError, MockupResult};
use crate::store::record::RecordStore;

/// Collection orders are written into.
pub const ORDERS_COLLECTION: &str = "orders";

/// Business days between order and delivery.
pub const DELIVERY_BUSINESS_DAYS: u32 = 6;

/// Quantity-based price break.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulkDiscountTier {
    pub min_quantity: u32,
    pub rate: f64,
    pub label: &'static str,
}

/// Highest tier first; the first tier the quantity reaches applies.
pub const BULK_DISCOUNT_TIERS: [BulkDiscountTier; 3] = [
    BulkDiscountTier {
        min_quantity: 50,
        rate: 0.20,
        label: "20% off on 50+ items",
    },
    BulkDiscountTier {
        min_quantity: 25,
        rate: 0.15,
        label: "15% off on 25+ items",
    },
    BulkDiscountTier {
        min_quantity: 10,
        rate: 0.10,
        label: "10% off on 10+ items",
    },
];

#[derive(Clone, Debug, PartialEq)]
pub struct PriceQuote {
    pub subtotal: f64,
    pub discount_rate: f64,
    pub discount_amount: f64,
    /// Rounded to whole currency units.
    pub final_total: f64,
    pub discount_label: Option<&'static str>,
}

pub fn bulk_discount(quantity: u32, base_price: f64) -> PriceQuote {
    let subtotal = base_price * f64::from(quantity);
    let tier = BULK_DISCOUNT_TIERS
        .iter()
        .find(|t| quantity >= t.min_quantity);
    let discount_rate = tier.map_or(0.0, |t| t.rate);
    let discount_amount = subtotal * discount_rate;
    PriceQuote {
        subtotal,
        discount_rate,
        discount_amount,
        final_total: (subtotal - discount_amount).round(),
        discount_label: tier.map(|t| t.label),
    }
}

/// Date `DELIVERY_BUSINESS_DAYS` weekdays after `order_date`.
pub fn estimate_delivery(order_date: NaiveDate) -> NaiveDate {
    let mut date = order_date;
    let mut added = 0;
    while added < DELIVERY_BUSINESS_DAYS {
        date = date.succ_opt().unwrap_or(date);
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            added += 1;
        }
    }
    date
}

/// `DD Mon YYYY`, e.g. `27 Oct 2026`.
pub fn format_delivery_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// `PX-<year>-<6 uppercase base-36 chars>`.
pub fn generate_order_id(year: i32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut n = uuid::Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(6);
    for _ in 0..6 {
        suffix.push(char::from(DIGITS[(n % 36) as usize]));
        n /= 36;
    }
    format!("PX-{year}-{suffix}")
}

/// The order being assembled for one product.
///
/// The mockup slot is filled only by a completed save on the composer session.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderDraft {
    pub item_id: String,
    pub item_name: String,
    pub base_price: f64,
    quantity: u32,
    mockup: Option<MockupDescriptor>,
}

impl OrderDraft {
    pub fn start(item_id: impl Into<String>, item_name: impl Into<String>, base_price: f64) -> Self {
        Self {
            item_id: item_id.into(),
            item_name: item_name.into(),
            base_price,
            quantity: 1,
            mockup: None,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: u32) -> MockupResult<()> {
        if quantity == 0 {
            return Err(MockupError::validation("quantity must be at least 1"));
        }
        self.quantity = quantity;
        Ok(())
    }

    pub fn quote(&self) -> PriceQuote {
        bulk_discount(self.quantity, self.base_price)
    }

    pub fn mockup(&self) -> Option<&MockupDescriptor> {
        self.mockup.as_ref()
    }

    pub(crate) fn attach_mockup(&mut self, descriptor: MockupDescriptor) {
        self.mockup = Some(descriptor);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    OrderPlaced,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderHistoryEntry {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub note: String,
}

/// Persisted order document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_id: String,
    pub item_id: String,
    pub product: String,
    pub quantity: u32,
    pub base_price: f64,
    pub total_amount: f64,
    pub discount_applied: f64,
    pub discount_label: String,
    pub estimated_delivery: String,
    pub customer_phone: String,
    pub order_status: OrderStatus,
    pub order_history: Vec<OrderHistoryEntry>,
    pub mockup_data: Option<MockupDescriptor>,
}

/// An order accepted by the record store.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedOrder {
    /// Store-assigned record id.
    pub record_id: String,
    pub order: OrderRecord,
}

/// Price, date and persist the draft. A missing mockup never blocks the order.
#[tracing::instrument(skip(draft, store, contact_phone), fields(item = %draft.item_id, qty = draft.quantity))]
pub fn submit_order(
    draft: &OrderDraft,
    store: &dyn RecordStore,
    contact_phone: &str,
    today: NaiveDate,
) -> MockupResult<PlacedOrder> {
    let phone = contact_phone.trim();
    if phone.is_empty() {
        return Err(MockupError::validation("contact phone is required"));
    }

    let quote = draft.quote();
    let order = OrderRecord {
        order_id: generate_order_id(today.year()),
        item_id: draft.item_id.clone(),
        product: draft.item_name.clone(),
        quantity: draft.quantity,
        base_price: draft.base_price,
        total_amount: quote.final_total,
        discount_applied: quote.discount_amount,
        discount_label: quote.discount_label.unwrap_or_default().to_string(),
        estimated_delivery: format_delivery_date(estimate_delivery(today)),
        customer_phone: phone.to_string(),
        order_status: OrderStatus::OrderPlaced,
        order_history: vec![OrderHistoryEntry {
            status: OrderStatus::OrderPlaced,
            timestamp: Utc::now(),
            note: "Order placed successfully".to_string(),
        }],
        mockup_data: draft.mockup.clone(),
    };
    if order.mockup_data.is_none() {
        tracing::warn!("order submitted without a saved mockup");
    }

    let record_id = store.put(ORDERS_COLLECTION, None, serde_json::to_value(&order)?)?;
    tracing::info!(order_id = %order.order_id, record_id = %record_id, "order placed");
    Ok(PlacedOrder { record_id, order })
}

#[cfg(test)]
#[path = "../../tests/unit/store/order.rs"]
mod tests;
