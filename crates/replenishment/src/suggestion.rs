use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use boteco_catalog::Product;
use boteco_core::ProductId;
use boteco_inventory::StockCell;

/// Advisory reorder line for one ingredient at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentSuggestion {
    pub product: ProductId,
    pub product_name: String,
    pub suggested_quantity: Decimal,
    pub current_quantity: Decimal,
    pub minimum_quantity: Decimal,
}

/// `ceil((minimum - current) + safety_margin)`.
pub fn suggested_quantity(cell: &StockCell, safety_margin: Decimal) -> Decimal {
    ((cell.minimum_quantity() - cell.quantity()) + safety_margin).ceil()
}

/// Every ingredient cell at or below its threshold, sorted by product name.
///
/// Cells whose product is not an ingredient are ignored; the caller pairs
/// each cell with its product.
pub fn suggest<'a>(
    cells: impl IntoIterator<Item = (&'a StockCell, &'a Product)>,
    safety_margin: Decimal,
) -> Vec<ReplenishmentSuggestion> {
    let mut suggestions: Vec<ReplenishmentSuggestion> = cells
        .into_iter()
        .filter(|(cell, product)| product.is_ingredient() && cell.needs_replenishment())
        .map(|(cell, product)| ReplenishmentSuggestion {
            product: product.id,
            product_name: product.name.clone(),
            suggested_quantity: suggested_quantity(cell, safety_margin),
            current_quantity: cell.quantity(),
            minimum_quantity: cell.minimum_quantity(),
        })
        .collect();
    suggestions.sort_by(|a, b| a.product_name.cmp(&b.product_name));
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use boteco_catalog::NewProduct;
    use boteco_core::LocationId;
    use boteco_inventory::StockKey;
    use rust_decimal_macros::dec;

    fn cell(product: &Product, quantity: Decimal, minimum: Decimal) -> StockCell {
        let mut cell = StockCell::empty(StockKey::new(LocationId::new(), product.id));
        cell.add(quantity).unwrap();
        cell.set_minimum_quantity(minimum);
        cell
    }

    #[test]
    fn suggests_the_shortfall_rounded_up_plus_margin() {
        let beer = NewProduct::ingredient("Chopp Litro").into_product(ProductId::new()).unwrap();
        let c = cell(&beer, dec!(2.5), dec!(10));
        assert_eq!(suggested_quantity(&c, Decimal::ZERO), dec!(8));
        assert_eq!(suggested_quantity(&c, dec!(2)), dec!(10));
    }

    #[test]
    fn only_low_ingredient_cells_are_suggested_in_name_order() {
        let lime = NewProduct::ingredient("Limão").into_product(ProductId::new()).unwrap();
        let beer = NewProduct::ingredient("Chopp Litro").into_product(ProductId::new()).unwrap();
        let ice = NewProduct::ingredient("Gelo").into_product(ProductId::new()).unwrap();
        let tower = NewProduct::composite("Torre de Chopp").into_product(ProductId::new()).unwrap();

        let cells = [
            (cell(&lime, dec!(1), dec!(5)), &lime),
            (cell(&beer, dec!(5), dec!(5)), &beer),
            (cell(&ice, dec!(20), dec!(5)), &ice),
            (cell(&tower, dec!(0), dec!(3)), &tower),
        ];

        let suggestions = suggest(cells.iter().map(|(c, p)| (c, *p)), Decimal::ZERO);
        let names: Vec<&str> = suggestions.iter().map(|s| s.product_name.as_str()).collect();
        assert_eq!(names, ["Chopp Litro", "Limão"]);
        assert_eq!(suggestions[0].suggested_quantity, Decimal::ZERO);
        assert_eq!(suggestions[1].suggested_quantity, dec!(4));
        assert_eq!(suggestions[1].current_quantity, dec!(1));
        assert_eq!(suggestions[1].minimum_quantity, dec!(5));
    }
}
