/// Financial ratios appended to every summary row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    pub gross_profit: f64,
    /// Percent of sales kept as profit; 0 when nothing was sold.
    pub profit_margin: f64,
    /// Sales per purchase dollar; 0 when nothing was purchased.
    pub sales_to_purchase_ratio: f64,
}

pub fn derive_metrics(total_sales_dollars: f64, total_purchase_dollars: f64) -> DerivedMetrics {
    let gross_profit = total_sales_dollars - total_purchase_dollars;
    let profit_margin = if total_sales_dollars != 0.0 {
        gross_profit / total_sales_dollars * 100.0
    } else {
        0.0
    };
    let sales_to_purchase_ratio = if total_purchase_dollars != 0.0 {
        total_sales_dollars / total_purchase_dollars
    } else {
        0.0
    };

    DerivedMetrics {
        gross_profit,
        profit_margin,
        sales_to_purchase_ratio,
    }
}
