//! Dashboard statistics for invoices and the directory records.
//!
//! Aggregation happens in Rust over narrow rows so the same code runs on
//! every backend; the row count is bounded by the table being summarised.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use invoicely_core::invoice::{InvoiceStatus, round_money};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::entities::products;

/// Customers listed in [`CustomerStats::top_customers`].
pub const TOP_CUSTOMERS: usize = 10;

/// Number of invoices in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    /// Draft invoices.
    pub draft: u64,
    /// Sent invoices.
    pub sent: u64,
    /// Paid invoices.
    pub paid: u64,
    /// Cancelled invoices.
    pub cancelled: u64,
}

/// Money totals across invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AmountSummary {
    /// Sum over every invoice that is not cancelled.
    pub total: Decimal,
    /// Sum over paid invoices.
    pub paid: Decimal,
    /// Sum over sent, not yet paid, invoices.
    pub pending: Decimal,
}

/// Count and total for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    /// Month, 1-12.
    pub month: u32,
    /// Invoices dated in the month.
    pub count: u64,
    /// Their total amount.
    pub total: Decimal,
}

/// Dashboard statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceStats {
    /// Every invoice, any status.
    pub total_invoices: u64,
    /// Counts per status.
    pub status_breakdown: StatusBreakdown,
    /// Money totals.
    pub amounts: AmountSummary,
    /// Year the monthly figures cover.
    pub year: i32,
    /// Months of `year` with at least one non-cancelled invoice, ascending.
    pub monthly_stats: Vec<MonthlySummary>,
}

impl InvoiceStats {
    /// Aggregates `(status, invoice_date, total_amount)` rows.
    pub fn from_rows<I>(year: i32, rows: I) -> Self
    where
        I: IntoIterator<Item = (InvoiceStatus, NaiveDate, Decimal)>,
    {
        let mut total_invoices = 0;
        let mut breakdown = StatusBreakdown::default();
        let mut amounts = AmountSummary::default();
        let mut months: [(u64, Decimal); 12] = [(0, Decimal::ZERO); 12];

        for (status, date, total) in rows {
            total_invoices += 1;
            match status {
                InvoiceStatus::Draft => breakdown.draft += 1,
                InvoiceStatus::Sent => {
                    breakdown.sent += 1;
                    amounts.pending += total;
                }
                InvoiceStatus::Paid => {
                    breakdown.paid += 1;
                    amounts.paid += total;
                }
                InvoiceStatus::Cancelled => {
                    breakdown.cancelled += 1;
                    continue;
                }
            }
            amounts.total += total;

            if date.year() == year {
                let slot = &mut months[date.month0() as usize];
                slot.0 += 1;
                slot.1 += total;
            }
        }

        let monthly_stats = (1..=12)
            .zip(months)
            .filter(|(_, (count, _))| *count > 0)
            .map(|(month, (count, total))| MonthlySummary { month, count, total })
            .collect();

        Self {
            total_invoices,
            status_breakdown: breakdown,
            amounts,
            year,
            monthly_stats,
        }
    }
}

/// Records sharing one `state` value. `None` groups records without a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateCount {
    /// The state.
    pub state: Option<String>,
    /// Records in it.
    pub count: u64,
}

fn count_by_state<I>(states: I) -> Vec<StateCount>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut counts: BTreeMap<Option<String>, u64> = BTreeMap::new();
    for state in states {
        *counts.entry(state).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(state, count)| StateCount { state, count })
        .collect()
}

/// Company statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyStats {
    /// Every company.
    pub total_companies: u64,
    /// Companies named on at least one invoice.
    pub companies_with_invoices: u64,
    /// Companies per state, `None` first, then alphabetical.
    pub companies_by_state: Vec<StateCount>,
}

impl CompanyStats {
    /// Aggregates company states and the `company_id` of every invoice.
    pub fn from_rows<S, R>(states: S, invoice_company_ids: R) -> Self
    where
        S: IntoIterator<Item = Option<String>>,
        R: IntoIterator<Item = Uuid>,
    {
        let companies_by_state = count_by_state(states);
        let referenced: HashSet<Uuid> = invoice_company_ids.into_iter().collect();

        Self {
            total_companies: companies_by_state.iter().map(|s| s.count).sum(),
            companies_with_invoices: referenced.len() as u64,
            companies_by_state,
        }
    }
}

/// A customer ranked by how many invoices it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopCustomer {
    /// Customer ID.
    pub id: Uuid,
    /// Customer name.
    pub name: String,
    /// Invoices billed to it.
    pub invoice_count: u64,
}

/// Customer statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerStats {
    /// Every customer.
    pub total_customers: u64,
    /// Customers billed on at least one invoice.
    pub customers_with_invoices: u64,
    /// Customers per state, `None` first, then alphabetical.
    pub customers_by_state: Vec<StateCount>,
    /// Up to [`TOP_CUSTOMERS`] customers with invoices, most invoices first,
    /// ties broken by name.
    pub top_customers: Vec<TopCustomer>,
}

impl CustomerStats {
    /// Aggregates `(id, name, state)` customer rows and the `customer_id`
    /// of every invoice.
    pub fn from_rows<C, R>(customers: C, invoice_customer_ids: R) -> Self
    where
        C: IntoIterator<Item = (Uuid, String, Option<String>)>,
        R: IntoIterator<Item = Uuid>,
    {
        let mut invoice_counts: HashMap<Uuid, u64> = HashMap::new();
        for id in invoice_customer_ids {
            *invoice_counts.entry(id).or_default() += 1;
        }

        let mut states = Vec::new();
        let mut top_customers = Vec::new();
        for (id, name, state) in customers {
            states.push(state);
            if let Some(&invoice_count) = invoice_counts.get(&id) {
                top_customers.push(TopCustomer { id, name, invoice_count });
            }
        }

        let customers_with_invoices = top_customers.len() as u64;
        top_customers.sort_by(|a, b| {
            b.invoice_count
                .cmp(&a.invoice_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        top_customers.truncate(TOP_CUSTOMERS);

        let customers_by_state = count_by_state(states);
        Self {
            total_customers: customers_by_state.iter().map(|s| s.count).sum(),
            customers_with_invoices,
            customers_by_state,
            top_customers,
        }
    }
}

/// Products sharing one category. `None` groups uncategorised products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The category.
    pub category: Option<String>,
    /// Products in it.
    pub count: u64,
}

/// Mean list price of one category, over its priced products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRate {
    /// The category.
    pub category: Option<String>,
    /// Mean rate rounded to 2 dp; zero when no product in it has a rate.
    pub avg_rate: Decimal,
}

/// Product statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductStats {
    /// Every product.
    pub total_products: u64,
    /// Products per category, `None` first, then alphabetical.
    pub products_by_category: Vec<CategoryCount>,
    /// Mean rate per category, same order.
    pub avg_rate_by_category: Vec<CategoryRate>,
    /// The priced product with the highest rate.
    pub highest_rate_product: Option<products::Model>,
    /// The priced product with the lowest rate.
    pub lowest_rate_product: Option<products::Model>,
}

impl ProductStats {
    /// Aggregates whole product rows. Products without a rate count toward
    /// their category but not toward its mean or the extremes.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = products::Model>,
    {
        // category -> (products, priced products, sum of rates)
        let mut categories: BTreeMap<Option<String>, (u64, u64, Decimal)> = BTreeMap::new();
        let mut highest: Option<products::Model> = None;
        let mut lowest: Option<products::Model> = None;
        let mut total_products = 0;

        for product in rows {
            total_products += 1;
            let slot = categories.entry(product.category.clone()).or_default();
            slot.0 += 1;

            let Some(rate) = product.rate else { continue };
            slot.1 += 1;
            slot.2 += rate;

            if highest.as_ref().and_then(|p| p.rate).is_none_or(|best| rate > best) {
                highest = Some(product.clone());
            }
            if lowest.as_ref().and_then(|p| p.rate).is_none_or(|best| rate < best) {
                lowest = Some(product);
            }
        }

        let mut products_by_category = Vec::with_capacity(categories.len());
        let mut avg_rate_by_category = Vec::with_capacity(categories.len());
        for (category, (count, priced, sum)) in categories {
            let avg_rate = if priced == 0 {
                Decimal::ZERO
            } else {
                round_money(sum / Decimal::from(priced))
            };
            products_by_category.push(CategoryCount {
                category: category.clone(),
                count,
            });
            avg_rate_by_category.push(CategoryRate { category, avg_rate });
        }

        Self {
            total_products,
            products_by_category,
            avg_rate_by_category,
            highest_rate_product: highest,
            lowest_rate_product: lowest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty() {
        let stats = InvoiceStats::from_rows(2024, Vec::new());
        assert_eq!(stats.total_invoices, 0);
        assert_eq!(stats.amounts, AmountSummary::default());
        assert!(stats.monthly_stats.is_empty());
    }

    #[test]
    fn test_cancelled_counted_but_not_summed() {
        let rows = vec![
            (InvoiceStatus::Draft, date(2024, 1, 5), dec!(100.00)),
            (InvoiceStatus::Sent, date(2024, 1, 20), dec!(200.00)),
            (InvoiceStatus::Paid, date(2024, 3, 2), dec!(300.00)),
            (InvoiceStatus::Cancelled, date(2024, 3, 9), dec!(999.00)),
        ];
        let stats = InvoiceStats::from_rows(2024, rows);

        assert_eq!(stats.total_invoices, 4);
        assert_eq!(
            stats.status_breakdown,
            StatusBreakdown { draft: 1, sent: 1, paid: 1, cancelled: 1 }
        );
        assert_eq!(stats.amounts.total, dec!(600.00));
        assert_eq!(stats.amounts.paid, dec!(300.00));
        assert_eq!(stats.amounts.pending, dec!(200.00));
        assert_eq!(
            stats.monthly_stats,
            vec![
                MonthlySummary { month: 1, count: 2, total: dec!(300.00) },
                MonthlySummary { month: 3, count: 1, total: dec!(300.00) },
            ]
        );
    }

    #[test]
    fn test_other_years_excluded_from_monthly() {
        let rows = vec![
            (InvoiceStatus::Paid, date(2023, 12, 31), dec!(50.00)),
            (InvoiceStatus::Paid, date(2024, 12, 1), dec!(70.00)),
        ];
        let stats = InvoiceStats::from_rows(2024, rows);

        assert_eq!(stats.amounts.paid, dec!(120.00));
        assert_eq!(
            stats.monthly_stats,
            vec![MonthlySummary { month: 12, count: 1, total: dec!(70.00) }]
        );
    }

    fn product(category: Option<&str>, name: &str, rate: Option<Decimal>) -> products::Model {
        let now = chrono::Utc::now().into();
        products::Model {
            id: Uuid::now_v7(),
            category: category.map(str::to_string),
            name: name.to_string(),
            description: None,
            unit: "NOS".to_string(),
            rate,
            hsn_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_company_stats_count_distinct_invoiced_companies() {
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        let states = vec![
            Some("Maharashtra".to_string()),
            None,
            Some("Gujarat".to_string()),
            Some("Maharashtra".to_string()),
        ];

        let stats = CompanyStats::from_rows(states, vec![a, a, b, a]);

        assert_eq!(stats.total_companies, 4);
        assert_eq!(stats.companies_with_invoices, 2);
        assert_eq!(
            stats.companies_by_state,
            vec![
                StateCount { state: None, count: 1 },
                StateCount { state: Some("Gujarat".into()), count: 1 },
                StateCount { state: Some("Maharashtra".into()), count: 2 },
            ]
        );
    }

    #[test]
    fn test_top_customers_ranked_and_capped() {
        let customers: Vec<(Uuid, String, Option<String>)> = (0..12)
            .map(|i| (Uuid::now_v7(), format!("Customer {i:02}"), None))
            .collect();
        // Customer 00 and 01 tie on three invoices; 11 has none.
        let mut invoiced = Vec::new();
        for (position, (id, _, _)) in customers.iter().take(11).enumerate() {
            let times = if position < 2 { 3 } else { 1 };
            invoiced.extend(std::iter::repeat_n(*id, times));
        }
        invoiced.push(customers[5].0);

        let stats = CustomerStats::from_rows(customers.clone(), invoiced);

        assert_eq!(stats.total_customers, 12);
        assert_eq!(stats.customers_with_invoices, 11);
        assert_eq!(stats.top_customers.len(), TOP_CUSTOMERS);
        let ranked: Vec<(&str, u64)> = stats
            .top_customers
            .iter()
            .map(|c| (c.name.as_str(), c.invoice_count))
            .take(4)
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("Customer 00", 3),
                ("Customer 01", 3),
                ("Customer 05", 2),
                ("Customer 02", 1),
            ]
        );
        assert!(stats.top_customers.iter().all(|c| c.id != customers[11].0));
    }

    #[test]
    fn test_product_stats_skip_unpriced_products() {
        let rows = vec![
            product(Some("Hardware"), "Widget", Some(dec!(100))),
            product(Some("Hardware"), "Gadget", Some(dec!(225.50))),
            product(Some("Hardware"), "Sample", None),
            product(Some("Services"), "Survey", None),
            product(None, "Loose", Some(dec!(0.335))),
        ];

        let stats = ProductStats::from_rows(rows);

        assert_eq!(stats.total_products, 5);
        assert_eq!(
            stats.products_by_category,
            vec![
                CategoryCount { category: None, count: 1 },
                CategoryCount { category: Some("Hardware".into()), count: 3 },
                CategoryCount { category: Some("Services".into()), count: 1 },
            ]
        );
        assert_eq!(
            stats.avg_rate_by_category,
            vec![
                CategoryRate { category: None, avg_rate: dec!(0.34) },
                CategoryRate { category: Some("Hardware".into()), avg_rate: dec!(162.75) },
                CategoryRate { category: Some("Services".into()), avg_rate: Decimal::ZERO },
            ]
        );
        assert_eq!(stats.highest_rate_product.unwrap().name, "Gadget");
        assert_eq!(stats.lowest_rate_product.unwrap().name, "Loose");
    }

    #[test]
    fn test_product_stats_empty_catalog() {
        let stats = ProductStats::from_rows(Vec::new());

        assert_eq!(stats.total_products, 0);
        assert!(stats.products_by_category.is_empty());
        assert!(stats.highest_rate_product.is_none());
        assert!(stats.lowest_rate_product.is_none());
    }
}
