use httpdns_application::ports::IpStackDetector;
use httpdns_domain::InterfaceSurvey;
use httpdns_infrastructure::system::{InterfaceSource, SystemInterfaces, SystemIpStackDetector};
use serde_json::json;

pub async fn run(json: bool) -> anyhow::Result<()> {
    let (stack, survey) = tokio::task::spawn_blocking(|| {
        let survey = SystemInterfaces
            .addresses()
            .map(InterfaceSurvey::from_addresses)
            .ok();
        (SystemIpStackDetector::new().detect(), survey)
    })
    .await?;

    let record_types: Vec<&str> = stack.record_types().iter().map(|t| t.as_str()).collect();

    if json {
        let survey = survey.map(|s| {
            json!({
                "ipv4_present": s.ipv4_present,
                "ipv6_quality": format!("{:?}", s.ipv6_quality).to_lowercase(),
                "nat64_suspected": s.nat64_suspected,
            })
        });
        let out = json!({
            "stack": stack.as_str(),
            "record_types": record_types,
            "interfaces": survey,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("stack\t{}", stack);
    println!("record_types\t{}", record_types.join(","));
    if let Some(s) = survey {
        println!("ipv4_present\t{}", s.ipv4_present);
        println!("ipv6_quality\t{:?}", s.ipv6_quality);
        println!("nat64_suspected\t{}", s.nat64_suspected);
    }
    Ok(())
}
