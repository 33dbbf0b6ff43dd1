/// One line of the performance sub-stream.
///
/// Wire shape: `name, id, transactionId, regionId, price, gain`
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRecord<'a> {
    pub name: &'a str,
    pub id: &'a str,
    pub transaction_id: &'a str,
    pub region_id: &'a str,
    /// Carried through untouched; nothing aggregates over it.
    pub price: &'a str,
    pub gain: f64,
}

/// One line of the rating sub-stream.
///
/// Wire shape: `id, regionId, rating`
#[derive(Debug, Clone, PartialEq)]
pub struct RatingRecord<'a> {
    pub id: &'a str,
    pub region_id: &'a str,
    pub rating: f64,
}
