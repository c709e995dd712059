//! Records loaded at start-up. Every session starts from this state.

use chrono::NaiveDate;

use crate::models::*;
use crate::policy::UserType;
use crate::store::RecordId;

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn unit(
    sequence: u32,
    blood_group: BloodGroup,
    collected: NaiveDate,
    expires: NaiveDate,
    status: UnitStatus,
) -> BloodUnit {
    BloodUnit {
        id: UnitId::from_sequence(sequence),
        blood_group,
        collection_date: collected,
        expiry_date: expires,
        volume: STANDARD_VOLUME_ML,
        status,
    }
}

pub fn initial_units() -> Vec<BloodUnit> {
    use BloodGroup::*;
    use UnitStatus::*;

    vec![
        unit(1001, APos, day(2023, 10, 25), day(2023, 12, 6), Available),
        unit(1002, ONeg, day(2023, 10, 20), day(2023, 12, 1), Available),
        unit(1003, BPos, day(2023, 10, 15), day(2023, 11, 26), Reserved),
        unit(1004, AbPos, day(2023, 10, 28), day(2023, 12, 9), Available),
        unit(1005, OPos, day(2023, 10, 26), day(2023, 12, 7), Available),
        unit(1006, ANeg, day(2023, 10, 1), day(2023, 11, 12), Expired),
        unit(1007, APos, day(2023, 10, 25), day(2023, 12, 6), Available),
        unit(1008, APos, day(2023, 10, 25), day(2023, 12, 6), Available),
        unit(1009, OPos, day(2023, 10, 25), day(2023, 12, 6), Available),
        unit(1010, OPos, day(2023, 10, 25), day(2023, 12, 6), Available),
        unit(1011, AbNeg, day(2023, 10, 25), day(2023, 12, 6), Available),
    ]
}

pub fn initial_donors() -> Vec<Donor> {
    vec![
        Donor {
            id: DonorId::from_sequence(1),
            name: "John Doe".to_owned(),
            age: 32,
            blood_group: BloodGroup::ONeg,
            contact: "+1 555-0123".to_owned(),
            last_donation_date: day(2023, 8, 15),
            status: DonorStatus::Active,
        },
        Donor {
            id: DonorId::from_sequence(2),
            name: "Jane Smith".to_owned(),
            age: 28,
            blood_group: BloodGroup::APos,
            contact: "+1 555-0124".to_owned(),
            last_donation_date: day(2023, 9, 20),
            status: DonorStatus::Active,
        },
        Donor {
            id: DonorId::from_sequence(3),
            name: "Robert Johnson".to_owned(),
            age: 45,
            blood_group: BloodGroup::BPos,
            contact: "+1 555-0125".to_owned(),
            last_donation_date: day(2023, 1, 10),
            status: DonorStatus::Deferred,
        },
    ]
}

pub fn initial_collections() -> Vec<Collection> {
    use CollectionStatus::*;
    use ProductType::*;

    [
        (8821, "John Doe", WholeBlood, 450, day(2023, 10, 25), Processed),
        (8822, "Sarah Conner", Platelets, 250, day(2023, 10, 25), Testing),
        (8823, "Mike Ross", WholeBlood, 450, day(2023, 10, 24), Processed),
        (8824, "Rachel Zane", Plasma, 200, day(2023, 10, 24), Rejected),
        (8825, "Harvey Specter", WholeBlood, 450, day(2023, 10, 23), Processed),
    ]
    .into_iter()
    .map(|(sequence, donor, product, amount, date, status)| Collection {
        id: CollectionId::from_sequence(sequence),
        donor: donor.to_owned(),
        product,
        amount,
        date,
        status,
    })
    .collect()
}

pub fn initial_requests() -> Vec<BloodRequest> {
    use RequestStatus::*;
    use Urgency::*;

    [
        (1, "City General Hospital", "Alice Williams", BloodGroup::APos, Critical, Pending, 3),
        (2, "St. Mary Medical Center", "Bob Brown", BloodGroup::ONeg, Normal, Approved, 1),
        (3, "City General Hospital", "Charlie Davis", BloodGroup::BPos, High, Dispatched, 2),
        (4, "Community Clinic", "Diana Evans", BloodGroup::AbPos, Normal, Pending, 1),
    ]
    .into_iter()
    .map(|(sequence, hospital, patient, blood_group, urgency, status, quantity)| {
        BloodRequest {
            id: RequestId::new(2023, sequence),
            hospital: hospital.to_owned(),
            patient: patient.to_owned(),
            email: format!("{}@example.com", patient.to_lowercase().replace(' ', ".")),
            blood_group,
            urgency,
            status,
            quantity,
            purpose: "Transfusion".to_owned(),
            referred_by: "Attending physician".to_owned(),
            user_type: UserType::Receiver,
            amount: f64::from(quantity) * 150.0,
        }
    })
    .collect()
}

pub fn initial_users() -> Vec<AppUser> {
    vec![
        AppUser {
            id: UserId::from_sequence(1),
            full_name: "Dr. Sarah Wilson".to_owned(),
            age: 48,
            sex: Sex::Female,
            blood_group: BloodGroup::OPos,
            email: "sarah.w@hemolife.org".to_owned(),
            phone: "+1 555-0201".to_owned(),
            address: "12 Harbor Road".to_owned(),
            role: "Medical Director".to_owned(),
            status: UserStatus::Active,
        },
        AppUser {
            id: UserId::from_sequence(2),
            full_name: "James Martin".to_owned(),
            age: 34,
            sex: Sex::Male,
            blood_group: BloodGroup::APos,
            email: "james.m@hemolife.org".to_owned(),
            phone: "+1 555-0202".to_owned(),
            address: "48 Elm Street".to_owned(),
            role: "Lab Technician".to_owned(),
            status: UserStatus::Active,
        },
        AppUser {
            id: UserId::from_sequence(3),
            full_name: "Emily Chen".to_owned(),
            age: 39,
            sex: Sex::Female,
            blood_group: BloodGroup::BNeg,
            email: "emily.c@hemolife.org".to_owned(),
            phone: "+1 555-0203".to_owned(),
            address: "7 Lakeview Avenue".to_owned(),
            role: "Administrator".to_owned(),
            status: UserStatus::Inactive,
        },
    ]
}
