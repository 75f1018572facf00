//! Round-trip tests: parsing canonical snippets yields hand-constructed IR.

use svl_core::ast::{
    Aggregation, Axis, ChartType, DatasetSource, Datasets, LayoutNode, Plot, SortDirection,
    TemporalUnit, Visualization,
};
use svl_core::parse_svl;

fn file_datasets(bindings: &[(&str, &str)]) -> Datasets {
    let mut datasets = Datasets::new();
    for (name, path) in bindings {
        datasets.insert(*name, DatasetSource::File(path.to_string()));
    }
    datasets
}

fn single(plot: Plot) -> LayoutNode {
    LayoutNode::VCat(vec![LayoutNode::Leaf(Box::new(plot))])
}

#[test]
fn line_chart() {
    let source = r#"
    DATASETS
        bigfoot "data/bigfoot_sightings.csv"
    LINE bigfoot
        X date by year LABEL "Year"
        Y date COUNT LABEL "Number of Sightings"
        SPLIT BY classification
        TITLE "Bigfoot Sightings by Year and Classification"
        FILTER "date > '1990-01-01'"
    "#;

    let mut plot = Plot::new(ChartType::Line, "bigfoot");
    plot.x = Some(Axis {
        field: Some("date".into()),
        temporal: Some(TemporalUnit::Year),
        label: Some("Year".into()),
        ..Axis::default()
    });
    plot.y = Some(Axis {
        field: Some("date".into()),
        agg: Some(Aggregation::Count),
        label: Some("Number of Sightings".into()),
        ..Axis::default()
    });
    plot.split_by = Some(Axis::field("classification"));
    plot.title = Some("Bigfoot Sightings by Year and Classification".into());
    plot.filter = Some("date > '1990-01-01'".into());

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "data/bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn bar_chart() {
    let source = r#"
    DATASETS
        bigfoot "data/bigfoot_sightings.csv"
    BAR bigfoot
        X classification
        Y classification COUNT
    "#;

    let mut plot = Plot::new(ChartType::Bar, "bigfoot");
    plot.x = Some(Axis::field("classification"));
    plot.y = Some(Axis {
        field: Some("classification".into()),
        agg: Some(Aggregation::Count),
        ..Axis::default()
    });

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "data/bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn histogram_step() {
    let source = r#"
    DATASETS
        bigfoot "data/bigfoot_sightings.csv"
    HISTOGRAM bigfoot
        X temperature_mid
        STEP 5
    "#;

    let mut plot = Plot::new(ChartType::Histogram, "bigfoot");
    plot.x = Some(Axis::field("temperature_mid"));
    plot.step = Some(5.0);

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "data/bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn histogram_bins() {
    let source = r#"
    DATASETS
        bigfoot "data/bigfoot_sightings.csv"
    HISTOGRAM bigfoot
        TITLE "Bigfoot Sighting Humidity"
        BINS 25
        Y humidity LABEL "Humidity"
    "#;

    let mut plot = Plot::new(ChartType::Histogram, "bigfoot");
    plot.title = Some("Bigfoot Sighting Humidity".into());
    plot.bins = Some(25);
    plot.y = Some(Axis {
        field: Some("humidity".into()),
        label: Some("Humidity".into()),
        ..Axis::default()
    });

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "data/bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn histogram_split_by() {
    let source = r#"
    DATASETS
        bigfoot "data/bigfoot_sightings.csv"
    HISTOGRAM bigfoot
        X temperature_mid
        STEP 5
        SPLIT BY classification
    "#;

    let mut plot = Plot::new(ChartType::Histogram, "bigfoot");
    plot.x = Some(Axis::field("temperature_mid"));
    plot.step = Some(5.0);
    plot.split_by = Some(Axis::field("classification"));

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "data/bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn pie_with_transform_preserves_payload() {
    let source = "
    DATASETS
        bigfoot \"data/bigfoot_sightings.csv\"
    PIE bigfoot
        TITLE \"Bigfoot Sightings with Location\"
        HOLE 0.3
        AXIS TRANSFORM \"CASE WHEN latitude IS NULL THEN 'no_location'\n            ELSE 'has_location' END\"
    ";

    let mut plot = Plot::new(ChartType::Pie, "bigfoot");
    plot.title = Some("Bigfoot Sightings with Location".into());
    plot.hole = Some(0.3);
    plot.axis = Some(Axis::transform(
        "CASE WHEN latitude IS NULL THEN 'no_location'\n            ELSE 'has_location' END",
    ));

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "data/bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn scatter_chart() {
    let source = r#"
    DATASETS
        bigfoot "data/bigfoot_sightings.csv"
    SCATTER bigfoot
        X latitude
        Y temperature_mid
        SPLIT BY classification
    "#;

    let mut plot = Plot::new(ChartType::Scatter, "bigfoot");
    plot.x = Some(Axis::field("latitude"));
    plot.y = Some(Axis::field("temperature_mid"));
    plot.split_by = Some(Axis::field("classification"));

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "data/bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn keywords_are_case_insensitive() {
    let source = r#"
    DATASETS
        bigfoot "data/bigfoot_sightings.csv"
    bar bigfoot
        x classification
        y classification CoUnT
    "#;

    let mut plot = Plot::new(ChartType::Bar, "bigfoot");
    plot.x = Some(Axis::field("classification"));
    plot.y = Some(Axis {
        field: Some("classification".into()),
        agg: Some(Aggregation::Count),
        ..Axis::default()
    });

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "data/bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn comments_are_dropped() {
    let source = r#"
    DATASETS
        -- Time to go squatchin.
        bigfoot "data/bigfoot_sightings.csv"
    HISTOGRAM bigfoot
        X temperature_mid
        STEP 5 -- Every five degrees should be granular enough.
    "#;

    let mut plot = Plot::new(ChartType::Histogram, "bigfoot");
    plot.x = Some(Axis::field("temperature_mid"));
    plot.step = Some(5.0);

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "data/bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn concat_builds_hcat() {
    let source = r#"
    DATASETS
        bigfoot "data/bigfoot_sightings.csv"
    CONCAT(
        SCATTER bigfoot
            X latitude
            Y temperature_mid
        BAR bigfoot
            X classification
            Y classification COUNT
    )
    "#;

    let mut scatter = Plot::new(ChartType::Scatter, "bigfoot");
    scatter.x = Some(Axis::field("latitude"));
    scatter.y = Some(Axis::field("temperature_mid"));

    let mut bar = Plot::new(ChartType::Bar, "bigfoot");
    bar.x = Some(Axis::field("classification"));
    bar.y = Some(Axis {
        field: Some("classification".into()),
        agg: Some(Aggregation::Count),
        ..Axis::default()
    });

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "data/bigfoot_sightings.csv")]),
        layout: LayoutNode::VCat(vec![LayoutNode::HCat(vec![
            LayoutNode::Leaf(Box::new(scatter)),
            LayoutNode::Leaf(Box::new(bar)),
        ])]),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn bare_parens_build_vcat() {
    let source = r#"
    DATASETS
        bigfoot "data/bigfoot_sightings.csv"
    (
        SCATTER bigfoot
            X latitude
            Y temperature_mid
        BAR bigfoot
            X classification
            Y classification COUNT
    )
    "#;

    let mut scatter = Plot::new(ChartType::Scatter, "bigfoot");
    scatter.x = Some(Axis::field("latitude"));
    scatter.y = Some(Axis::field("temperature_mid"));

    let mut bar = Plot::new(ChartType::Bar, "bigfoot");
    bar.x = Some(Axis::field("classification"));
    bar.y = Some(Axis {
        field: Some("classification".into()),
        agg: Some(Aggregation::Count),
        ..Axis::default()
    });

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "data/bigfoot_sightings.csv")]),
        layout: LayoutNode::VCat(vec![LayoutNode::VCat(vec![
            LayoutNode::Leaf(Box::new(scatter)),
            LayoutNode::Leaf(Box::new(bar)),
        ])]),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn sql_dataset() {
    let source = r#"
    DATASETS
        bigfoot "bigfoot_sightings.csv"
        recent_bigfoot_sightings SQL
            "SELECT * FROM bigfoot WHERE date >= '2008-01-01'"
    HISTOGRAM recent_bigfoot_sightings
        X temperature_mid
    "#;

    let mut datasets = file_datasets(&[("bigfoot", "bigfoot_sightings.csv")]);
    datasets.insert(
        "recent_bigfoot_sightings",
        DatasetSource::Sql("SELECT * FROM bigfoot WHERE date >= '2008-01-01'".into()),
    );

    let mut plot = Plot::new(ChartType::Histogram, "recent_bigfoot_sightings");
    plot.x = Some(Axis::field("temperature_mid"));

    let truth = Visualization {
        datasets,
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn missing_datasets_section_parses() {
    let source = r#"
    HISTOGRAM bigfoot
        X temperature_mid
        SPLIT BY classification
    "#;

    let mut plot = Plot::new(ChartType::Histogram, "bigfoot");
    plot.x = Some(Axis::field("temperature_mid"));
    plot.split_by = Some(Axis::field("classification"));

    // A validator catches the dangling reference later; as far as parsing
    // goes this is a legal program.
    let truth = Visualization {
        datasets: Datasets::new(),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn sort_modifier() {
    let source = r#"
    DATASETS
        bigfoot "bigfoot_sightings.csv"
    BAR bigfoot
        X classification SORT ASC
        Y classification COUNT
    "#;

    let mut plot = Plot::new(ChartType::Bar, "bigfoot");
    plot.x = Some(Axis {
        field: Some("classification".into()),
        sort: Some(SortDirection::Asc),
        ..Axis::default()
    });
    plot.y = Some(Axis {
        field: Some("classification".into()),
        agg: Some(Aggregation::Count),
        ..Axis::default()
    });

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn color_by_with_scale() {
    let source = r#"
    DATASETS
        bigfoot "bigfoot_sightings.csv"
    LINE bigfoot
        X date BY YEAR
        Y report_id COUNT LABEL "Number of Sightings"
        COLOR BY temperature_mid AVG "Jet" LABEL "Average Temperature (F)"
    "#;

    let mut plot = Plot::new(ChartType::Line, "bigfoot");
    plot.x = Some(Axis {
        field: Some("date".into()),
        temporal: Some(TemporalUnit::Year),
        ..Axis::default()
    });
    plot.y = Some(Axis {
        field: Some("report_id".into()),
        agg: Some(Aggregation::Count),
        label: Some("Number of Sightings".into()),
        ..Axis::default()
    });
    plot.color_by = Some(Axis {
        field: Some("temperature_mid".into()),
        agg: Some(Aggregation::Avg),
        color_scale: Some("Jet".into()),
        label: Some("Average Temperature (F)".into()),
        ..Axis::default()
    });

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn split_by_transform() {
    let source = r#"
    DATASETS
        bigfoot "bigfoot_sightings.csv"
    LINE bigfoot
        X date BY YEAR
        Y report_id COUNT
        SPLIT BY TRANSFORM
            "CASE WHEN temperature > 85 THEN 'hot' ELSE 'not_hot' END"
    "#;

    let mut plot = Plot::new(ChartType::Line, "bigfoot");
    plot.x = Some(Axis {
        field: Some("date".into()),
        temporal: Some(TemporalUnit::Year),
        ..Axis::default()
    });
    plot.y = Some(Axis {
        field: Some("report_id".into()),
        agg: Some(Aggregation::Count),
        ..Axis::default()
    });
    plot.split_by = Some(Axis::transform(
        "CASE WHEN temperature > 85 THEN 'hot' ELSE 'not_hot' END",
    ));

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn split_by_temporal() {
    let source = r#"
    DATASETS bigfoot "bigfoot_sightings.csv"
    BAR bigfoot
        X classification
        Y report_number COUNT
        SPLIT BY date BY YEAR
    "#;

    let mut plot = Plot::new(ChartType::Bar, "bigfoot");
    plot.x = Some(Axis::field("classification"));
    plot.y = Some(Axis {
        field: Some("report_number".into()),
        agg: Some(Aggregation::Count),
        ..Axis::default()
    });
    plot.split_by = Some(Axis {
        field: Some("date".into()),
        temporal: Some(TemporalUnit::Year),
        ..Axis::default()
    });

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}

#[test]
fn split_by_label() {
    let source = r#"
    DATASETS bigfoot "bigfoot_sightings.csv"
    HISTOGRAM bigfoot
        X temperature
        SPLIT BY classification LABEL "Classification"
    "#;

    let mut plot = Plot::new(ChartType::Histogram, "bigfoot");
    plot.x = Some(Axis::field("temperature"));
    plot.split_by = Some(Axis {
        field: Some("classification".into()),
        label: Some("Classification".into()),
        ..Axis::default()
    });

    let truth = Visualization {
        datasets: file_datasets(&[("bigfoot", "bigfoot_sightings.csv")]),
        layout: single(plot),
    };

    assert_eq!(parse_svl(source).unwrap(), truth);
}
