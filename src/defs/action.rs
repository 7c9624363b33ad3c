// AUTO-GENERATED - see tools/gen_mobjinfo

#[derive(Debug, Copy, Clone)]
#[allow(non_camel_case_types)]
pub enum Action {
    None,
    Look,
    Chase,
    FaceTarget,
    PosAttack,
    Scream,
    Fall,
    XScream,
    Explode,
}
