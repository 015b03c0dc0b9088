use anyhow::Result;
use arrow::record_batch::RecordBatch;
use duckdb::Connection;
use tracing::{error, info};

use crate::schema::{
    purchase_prices as pp, purchases as p, sales as s, vendor_invoice as vi,
    vendor_sales_summary as out,
};
use crate::store;

/// The per-vendor, per-brand summary query.
///
/// Freight is summed per vendor, purchases per price-list group and sales
/// per (vendor, brand); both sales and freight are left-joined onto the
/// purchase groups. `SalesPrice` is summed, not averaged.
pub fn vendor_summary_sql() -> String {
    format!(
        r#"
WITH FreightSummary AS (
    SELECT
        {vi_vendor},
        SUM({vi_freight}) AS {freight_cost}
    FROM {vi_table}
    GROUP BY {vi_vendor}
),
PurchaseSummary AS (
    SELECT
        p.{p_vendor},
        p.{p_vendor_name},
        p.{p_brand},
        p.{p_description},
        p.{p_purchase_price},
        pp.{pp_volume},
        pp.{pp_price} AS {actual_price},
        SUM(p.{p_quantity}) AS {total_purchase_quantity},
        SUM(p.{p_dollars}) AS {total_purchase_dollars}
    FROM {p_table} p
    JOIN {pp_table} pp
        ON p.{p_brand} = pp.{pp_brand}
    GROUP BY p.{p_vendor}, p.{p_vendor_name}, p.{p_brand}, p.{p_description}, p.{p_purchase_price}, pp.{pp_price}, pp.{pp_volume}
),
SalesSummary AS (
    SELECT
        {s_vendor},
        {s_brand},
        SUM({s_dollars}) AS {total_sales_dollars},
        SUM({s_price}) AS {total_sales_price},
        SUM({s_quantity}) AS {total_sales_quantity},
        SUM({s_excise}) AS {total_excise_tax}
    FROM {s_table}
    GROUP BY {s_vendor}, {s_brand}
)
SELECT
    ps.{vendor_name},
    ps.{vendor_number},
    ps.{brand},
    ps.{description},
    ps.{actual_price},
    ps.{purchase_price},
    ps.{volume},
    ps.{total_purchase_quantity},
    ps.{total_purchase_dollars},
    ss.{total_sales_quantity},
    ss.{total_sales_dollars},
    ss.{total_sales_price},
    ss.{total_excise_tax},
    fs.{freight_cost}
FROM PurchaseSummary ps
LEFT JOIN SalesSummary ss
    ON ps.{p_vendor} = ss.{s_vendor}
   AND ps.{p_brand} = ss.{s_brand}
LEFT JOIN FreightSummary fs
    ON ps.{p_vendor} = fs.{vi_vendor}
ORDER BY ps.{total_purchase_dollars} DESC
"#,
        vi_table = vi::TABLE,
        vi_vendor = vi::VENDOR_NUMBER,
        vi_freight = vi::FREIGHT,
        p_table = p::TABLE,
        p_vendor = p::VENDOR_NUMBER,
        p_vendor_name = p::VENDOR_NAME,
        p_brand = p::BRAND,
        p_description = p::DESCRIPTION,
        p_purchase_price = p::PURCHASE_PRICE,
        p_quantity = p::QUANTITY,
        p_dollars = p::DOLLARS,
        pp_table = pp::TABLE,
        pp_brand = pp::BRAND,
        pp_price = pp::PRICE,
        pp_volume = pp::VOLUME,
        s_table = s::TABLE,
        s_vendor = s::VENDOR_NO,
        s_brand = s::BRAND,
        s_dollars = s::SALES_DOLLARS,
        s_price = s::SALES_PRICE,
        s_quantity = s::SALES_QUANTITY,
        s_excise = s::EXCISE_TAX,
        vendor_name = out::VENDOR_NAME,
        vendor_number = out::VENDOR_NUMBER,
        brand = out::BRAND,
        description = out::DESCRIPTION,
        actual_price = out::ACTUAL_PRICE,
        purchase_price = out::PURCHASE_PRICE,
        volume = out::VOLUME,
        total_purchase_quantity = out::TOTAL_PURCHASE_QUANTITY,
        total_purchase_dollars = out::TOTAL_PURCHASE_DOLLARS,
        total_sales_quantity = out::TOTAL_SALES_QUANTITY,
        total_sales_dollars = out::TOTAL_SALES_DOLLARS,
        total_sales_price = out::TOTAL_SALES_PRICE,
        total_excise_tax = out::TOTAL_EXCISE_TAX,
        freight_cost = out::FREIGHT_COST,
    )
}

/// Run the summary query against the loaded tables.
#[tracing::instrument(level = "info", skip(conn))]
pub fn create_vendor_summary(conn: &Connection) -> Result<RecordBatch> {
    match store::query_batch(conn, &vendor_summary_sql()) {
        Ok(batch) => {
            info!("Vendor sales summary query executed successfully.");
            Ok(batch)
        }
        Err(e) => {
            error!("Error creating vendor summary: {:#}", e);
            Err(e.context("creating vendor summary"))
        }
    }
}
