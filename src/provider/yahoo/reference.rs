//! Static B3 reference data: the trending watchlist and the symbol table
//! used for search scoring and validation suggestions.

use lazy_static::lazy_static;

/// A known B3 listing used for suggestion and relevance scoring.
pub struct ReferenceStock {
    pub symbol: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
}

/// Symbols fanned out for the B3 trending list.
pub const B3_WATCHLIST: &[&str] = &[
    "PETR4.SA", "VALE3.SA", "ITUB4.SA", "BBDC4.SA", "B3SA3.SA", "ABEV3.SA", "WEGE3.SA",
    "MGLU3.SA", "JBSS3.SA", "RENT3.SA", "SUZB3.SA", "RAIL3.SA", "USIM5.SA", "CSNA3.SA",
    "GOAU4.SA",
];

lazy_static! {
    /// Major B3 listings. Static for now; a live listing feed could replace
    /// this later.
    pub static ref B3_REFERENCE: Vec<ReferenceStock> = vec![
        ReferenceStock { symbol: "PETR4.SA", name: "Petróleo Brasileiro S.A. - Petrobras", sector: "Energy" },
        ReferenceStock { symbol: "PETR3.SA", name: "Petróleo Brasileiro S.A. - Petrobras", sector: "Energy" },
        ReferenceStock { symbol: "VALE3.SA", name: "Vale S.A.", sector: "Materials" },
        ReferenceStock { symbol: "ITUB4.SA", name: "Itaú Unibanco Holding S.A.", sector: "Financial Services" },
        ReferenceStock { symbol: "ITUB3.SA", name: "Itaú Unibanco Holding S.A.", sector: "Financial Services" },
        ReferenceStock { symbol: "BBDC4.SA", name: "Banco Bradesco S.A.", sector: "Financial Services" },
        ReferenceStock { symbol: "BBDC3.SA", name: "Banco Bradesco S.A.", sector: "Financial Services" },
        ReferenceStock { symbol: "B3SA3.SA", name: "B3 S.A. - Brasil, Bolsa, Balcão", sector: "Financial Services" },
        ReferenceStock { symbol: "MGLU3.SA", name: "Magazine Luiza S.A.", sector: "Consumer Cyclical" },
        ReferenceStock { symbol: "WEGE3.SA", name: "WEG S.A.", sector: "Industrials" },
        ReferenceStock { symbol: "ABEV3.SA", name: "Ambev S.A.", sector: "Consumer Staples" },
        ReferenceStock { symbol: "JBSS3.SA", name: "JBS S.A.", sector: "Consumer Staples" },
        ReferenceStock { symbol: "RENT3.SA", name: "Localiza Rent a Car S.A.", sector: "Industrials" },
        ReferenceStock { symbol: "SUZB3.SA", name: "Suzano S.A.", sector: "Materials" },
        ReferenceStock { symbol: "RAIL3.SA", name: "Rumo S.A.", sector: "Industrials" },
        ReferenceStock { symbol: "USIM5.SA", name: "Usinas Siderúrgicas de Minas Gerais S.A.", sector: "Materials" },
        ReferenceStock { symbol: "CSNA3.SA", name: "Companhia Siderúrgica Nacional", sector: "Materials" },
        ReferenceStock { symbol: "GOAU4.SA", name: "Metalúrgica Gerdau S.A.", sector: "Materials" },
        ReferenceStock { symbol: "BBAS3.SA", name: "Banco do Brasil S.A.", sector: "Financial Services" },
        ReferenceStock { symbol: "SANB11.SA", name: "Banco Santander (Brasil) S.A.", sector: "Financial Services" },
    ];
}

/// Token-overlap relevance of a reference stock for a search query.
///
/// Symbol substring match scores 1.0, full-query name match 0.8, plus 0.3
/// for each query word found in the name.
pub fn relevance_score(query: &str, stock: &ReferenceStock) -> f64 {
    let query = query.to_lowercase();
    let name = stock.name.to_lowercase();
    let mut score = 0.0;

    if stock.symbol.to_lowercase().contains(&query) {
        score += 1.0;
    }
    if name.contains(&query) {
        score += 0.8;
    }
    for word in query.split_whitespace() {
        if name.contains(word) {
            score += 0.3;
        }
    }
    score
}

/// Up to three alternative symbols for an invalid ticker.
///
/// An unqualified input first suggests its ".SA" variant, then reference
/// symbols whose base is a substring match in either direction.
pub fn suggestions_for(invalid_symbol: &str) -> Vec<String> {
    let mut suggestions = Vec::new();

    if !invalid_symbol.ends_with(".SA") && !invalid_symbol.contains('.') {
        suggestions.push(format!("{}.SA", invalid_symbol));
    }

    let invalid_base = invalid_symbol.to_lowercase().replace(".sa", "");
    for stock in B3_REFERENCE.iter() {
        let base = stock.symbol.trim_end_matches(".SA").to_lowercase();
        if base.contains(&invalid_base) || invalid_base.contains(&base) {
            suggestions.push(stock.symbol.to_string());
        }
    }

    suggestions.truncate(3);
    suggestions
}
