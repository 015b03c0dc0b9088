// src/schema/mod.rs
//
// Table and column names the summary query expects the loader to have
// produced. The loader derives table names from CSV file stems, so these
// double as the expected input file names (`purchases.csv`, ...).

pub mod arrow;

pub use self::arrow::map_to_duckdb_type;

/// Source table of individual purchase lines.
pub mod purchases {
    pub const TABLE: &str = "purchases";
    pub const VENDOR_NUMBER: &str = "VendorNumber";
    pub const VENDOR_NAME: &str = "VendorName";
    pub const BRAND: &str = "Brand";
    pub const DESCRIPTION: &str = "Description";
    pub const PURCHASE_PRICE: &str = "PurchasePrice";
    pub const QUANTITY: &str = "Quantity";
    pub const DOLLARS: &str = "Dollars";
}

/// Per-brand price list.
pub mod purchase_prices {
    pub const TABLE: &str = "purchase_prices";
    pub const BRAND: &str = "Brand";
    pub const PRICE: &str = "Price";
    pub const VOLUME: &str = "Volume";
}

/// Source table of individual sales lines.
pub mod sales {
    pub const TABLE: &str = "sales";
    pub const VENDOR_NO: &str = "VendorNo";
    pub const BRAND: &str = "Brand";
    pub const SALES_DOLLARS: &str = "SalesDollars";
    pub const SALES_PRICE: &str = "SalesPrice";
    pub const SALES_QUANTITY: &str = "SalesQuantity";
    pub const EXCISE_TAX: &str = "ExciseTax";
}

/// Vendor invoices, carrying the freight charged per invoice.
pub mod vendor_invoice {
    pub const TABLE: &str = "vendor_invoice";
    pub const VENDOR_NUMBER: &str = "VendorNumber";
    pub const FREIGHT: &str = "Freight";
}

/// Output table written by the summarizer.
pub mod vendor_sales_summary {
    pub const TABLE: &str = "vendor_sales_summary";

    pub const VENDOR_NAME: &str = "VendorName";
    pub const VENDOR_NUMBER: &str = "VendorNumber";
    pub const BRAND: &str = "Brand";
    pub const DESCRIPTION: &str = "Description";
    pub const ACTUAL_PRICE: &str = "ActualPrice";
    pub const PURCHASE_PRICE: &str = "PurchasePrice";
    pub const VOLUME: &str = "Volume";
    pub const TOTAL_PURCHASE_QUANTITY: &str = "TotalPurchaseQuantity";
    pub const TOTAL_PURCHASE_DOLLARS: &str = "TotalPurchaseDollars";
    pub const TOTAL_SALES_QUANTITY: &str = "TotalSalesQuantity";
    pub const TOTAL_SALES_DOLLARS: &str = "TotalSalesDollars";
    pub const TOTAL_SALES_PRICE: &str = "TotalSalesPrice";
    pub const TOTAL_EXCISE_TAX: &str = "TotalExciseTax";
    pub const FREIGHT_COST: &str = "FreightCost";

    pub const GROSS_PROFIT: &str = "GrossProfit";
    pub const PROFIT_MARGIN: &str = "ProfitMargin";
    pub const SALES_TO_PURCHASE_RATIO: &str = "SalesToPurchaseRatio";

    /// Columns produced by the query, in output order.
    pub const QUERY_COLUMNS: [&str; 14] = [
        VENDOR_NAME,
        VENDOR_NUMBER,
        BRAND,
        DESCRIPTION,
        ACTUAL_PRICE,
        PURCHASE_PRICE,
        VOLUME,
        TOTAL_PURCHASE_QUANTITY,
        TOTAL_PURCHASE_DOLLARS,
        TOTAL_SALES_QUANTITY,
        TOTAL_SALES_DOLLARS,
        TOTAL_SALES_PRICE,
        TOTAL_EXCISE_TAX,
        FREIGHT_COST,
    ];

    /// Columns appended by the cleaning stage.
    pub const DERIVED_COLUMNS: [&str; 3] = [GROSS_PROFIT, PROFIT_MARGIN, SALES_TO_PURCHASE_RATIO];
}
