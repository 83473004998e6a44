use boteco_catalog::{Product, RecipeLine};
use boteco_core::{DomainError, DomainResult, LocationId, Quantity};
use boteco_inventory::MovementDraft;

/// Consumption caused by selling `sold` units of `product` at `location`.
///
/// Composite: one exit per recipe line, `quantity_per_unit × sold`.
/// Ingredient: a single exit of `sold`. A composite without recipe lines
/// consumes nothing.
pub fn explode(
    product: &Product,
    recipe: &[RecipeLine],
    location: LocationId,
    sold: Quantity,
) -> DomainResult<Vec<MovementDraft>> {
    if product.is_ingredient() {
        return Ok(vec![MovementDraft::exit(product.id, sold, location)]);
    }

    recipe
        .iter()
        .map(|line| {
            if line.composite != product.id {
                return Err(DomainError::invariant(format!(
                    "recipe line does not belong to product '{}'",
                    product.name
                )));
            }
            Ok(MovementDraft::exit(
                line.ingredient,
                line.consumption_for(sold)?,
                location,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use boteco_catalog::NewProduct;
    use boteco_core::ProductId;
    use boteco_inventory::MovementKind;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn qty(v: Decimal) -> Quantity {
        Quantity::positive(v).unwrap()
    }

    #[test]
    fn consumption_out_of_range_is_a_validation_error() {
        let caipirinha = NewProduct::composite("Caipirinha").into_product(ProductId::new()).unwrap();
        let recipe = vec![RecipeLine {
            composite: caipirinha.id,
            ingredient: ProductId::new(),
            quantity_per_unit: qty(dec!(2)),
        }];

        let err = explode(&caipirinha, &recipe, LocationId::new(), qty(Decimal::MAX)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn composite_sale_consumes_each_recipe_line() {
        let tower = NewProduct::composite("Torre").into_product(ProductId::new()).unwrap();
        let (a, b) = (ProductId::new(), ProductId::new());
        let recipe = vec![
            RecipeLine { composite: tower.id, ingredient: a, quantity_per_unit: qty(dec!(2)) },
            RecipeLine { composite: tower.id, ingredient: b, quantity_per_unit: qty(dec!(1)) },
        ];
        let bar = LocationId::new();

        let drafts = explode(&tower, &recipe, bar, qty(dec!(5))).unwrap();

        assert_eq!(drafts, vec![
            MovementDraft::exit(a, qty(dec!(10)), bar),
            MovementDraft::exit(b, qty(dec!(5)), bar),
        ]);
    }

    #[test]
    fn ingredient_sale_is_a_single_exit() {
        let beer = NewProduct::ingredient("Chopp Litro").into_product(ProductId::new()).unwrap();
        let bar = LocationId::new();
        let drafts = explode(&beer, &[], bar, qty(dec!(7))).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, MovementKind::Exit);
        assert_eq!(drafts[0].product, beer.id);
        assert_eq!(drafts[0].source, Some(bar));
    }

    #[test]
    fn foreign_recipe_line_is_rejected() {
        let tower = NewProduct::composite("Torre").into_product(ProductId::new()).unwrap();
        let recipe = vec![RecipeLine {
            composite: ProductId::new(),
            ingredient: ProductId::new(),
            quantity_per_unit: qty(dec!(1)),
        }];
        assert!(explode(&tower, &recipe, LocationId::new(), qty(dec!(1))).is_err());
    }
}
