use crate::config::*;

/// The cutoff columns a candidate may be compared against.
///
/// A female candidate qualifies under the female pool and the gender-neutral
/// pool of her category. A candidate of a reserved category can always compete
/// for open seats as well. Labels that the master sheet does not provide are
/// dropped.
///
/// The result keeps the first-insertion order and has no duplicates. The
/// order only matters for display.
pub fn eligible_columns(
    category: &Category,
    gender: Gender,
    available: &[CutoffLabel],
) -> Vec<CutoffLabel> {
    let mut candidates: Vec<CutoffLabel> = Vec::new();

    if gender == Gender::Fem {
        candidates.extend(CutoffLabel::for_category(category, Gender::Fem));
    }
    candidates.extend(CutoffLabel::for_category(category, Gender::Gen));

    if !category.is_open() && CutoffLabel::for_category(category, gender).is_some() {
        candidates.push(CutoffLabel::OcGen);
        if gender == Gender::Fem {
            candidates.push(CutoffLabel::OcFem);
        }
    }

    let mut res: Vec<CutoffLabel> = Vec::new();
    for label in candidates {
        if available.contains(&label) && !res.contains(&label) {
            res.push(label);
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESERVED: [Category; 4] = [Category::Ews, Category::Obc, Category::Sc, Category::St];

    #[test]
    fn open_candidates_only_see_open_columns() {
        for gender in [Gender::Gen, Gender::Fem] {
            let cols = eligible_columns(&Category::Oc, gender, &CutoffLabel::ALL);
            assert!(!cols.is_empty());
            assert!(cols
                .iter()
                .all(|l| *l == CutoffLabel::OcGen || *l == CutoffLabel::OcFem));
        }
        assert_eq!(
            eligible_columns(&Category::Oc, Gender::Gen, &CutoffLabel::ALL),
            vec![CutoffLabel::OcGen]
        );
        assert_eq!(
            eligible_columns(&Category::Oc, Gender::Fem, &CutoffLabel::ALL),
            vec![CutoffLabel::OcFem, CutoffLabel::OcGen]
        );
    }

    #[test]
    fn reserved_female_candidates_always_see_open_gen() {
        for category in RESERVED.iter() {
            let cols = eligible_columns(category, Gender::Fem, &CutoffLabel::ALL);
            assert!(cols.contains(&CutoffLabel::OcGen), "{:?}", category);
            assert!(cols.contains(&CutoffLabel::OcFem), "{:?}", category);
        }
    }

    #[test]
    fn reserved_female_order() {
        assert_eq!(
            eligible_columns(&Category::Sc, Gender::Fem, &CutoffLabel::ALL),
            vec![
                CutoffLabel::ScFem,
                CutoffLabel::ScGen,
                CutoffLabel::OcGen,
                CutoffLabel::OcFem
            ]
        );
    }

    #[test]
    fn reserved_male_candidates_never_see_female_columns() {
        let cols = eligible_columns(&Category::Obc, Gender::Gen, &CutoffLabel::ALL);
        assert_eq!(cols, vec![CutoffLabel::ObcGen, CutoffLabel::OcGen]);
    }

    #[test]
    fn missing_columns_are_dropped() {
        let available = [CutoffLabel::OcGen, CutoffLabel::ScGen];
        assert_eq!(
            eligible_columns(&Category::Sc, Gender::Fem, &available),
            vec![CutoffLabel::ScGen, CutoffLabel::OcGen]
        );
        assert!(eligible_columns(&Category::St, Gender::Gen, &[CutoffLabel::EwsGen]).is_empty());
    }

    #[test]
    fn unrecognized_category_has_no_columns() {
        let cat = Category::parse("GENERAL-PWD");
        assert!(eligible_columns(&cat, Gender::Fem, &CutoffLabel::ALL).is_empty());
    }
}
