use alya_projection::*;

fn main() -> Result<()> {
    println!("📊 Annual Projection Demo\n");

    let config = ProjectionConfig {
        revenue_streams: vec![
            ProjectionItem::new("balcao", "Vendas balcão", 1),
            ProjectionItem::new("delivery", "Delivery", 2),
        ],
        mkt_components: vec![ProjectionItem::new("instagram", "Instagram", 1)],
    };

    let mut base = ProjectionBase {
        growth: GrowthRates::new(0.03, 0.08, 0.15),
        ..Default::default()
    };
    base.prev_year.fixed_expenses = MonthSeries::filled(4000.0);
    base.prev_year.variable_expenses = MonthSeries::from_values(
        &[
            1800.0, 1700.0, 1900.0, 2000.0, 2100.0, 2000.0, 2200.0, 2300.0, 2100.0, 2200.0,
            2600.0, 3200.0,
        ],
        "variable expenses",
    )?;
    base.prev_year.investments = MonthSeries::filled(500.0);
    base.prev_year.revenue_streams.insert(
        "balcao".to_string(),
        MonthSeries::from_values(
            &[
                7000.0, 6800.0, 7500.0, 7800.0, 8200.0, 8000.0, 8600.0, 8900.0, 8400.0, 8800.0,
                9800.0, 12500.0,
            ],
            "balcao",
        )?,
    );
    base.prev_year
        .revenue_streams
        .insert("delivery".to_string(), MonthSeries::filled(1500.0));
    base.prev_year
        .mkt_components
        .insert("instagram".to_string(), MonthSeries::filled(250.0));

    let mut projection = Projection::new("demo", config, base)?;

    println!("✏️  Manual edit: December delivery forecast set to 4.000");
    projection.set(
        &SeriesTarget::RevenueStream("delivery".to_string()),
        Scenario::Previsto,
        11,
        Some(4000.0),
    )?;

    let settings = EngineSettings::new(
        RateTable::uniform(ScenarioRateMap::direct()).with(
            Category::RevenueStreams,
            ScenarioRateMap::new(GrowthField::Minimo, GrowthField::Medio, GrowthField::Maximo),
        ),
    );

    let mut repo = InMemoryRepository::new();
    repo.save(&projection)?;

    let Some(stored) = repo.load()? else {
        println!("No projection stored");
        return Ok(());
    };
    let report = ProjectionProcessor::process_stored(&stored, &settings)?;

    println!("\n📈 Budget by month:");
    println!("  {:<5} {:>12} {:>12} {:>12}", "Mês", "Previsto", "Médio", "Máximo");
    for point in report.budget_chart(&settings.month_labels) {
        println!(
            "  {:<5} {:>12.2} {:>12.2} {:>12.2}",
            point.month, point.previsto, point.medio, point.maximo
        );
    }

    let totals = report.resultado.annual_totals();
    println!("\n💰 Resultado anual:");
    println!("  Previsto: {:.2}", totals.previsto);
    println!("  Médio:    {:.2}", totals.medio);
    println!("  Máximo:   {:.2}", totals.maximo);

    Ok(())
}
